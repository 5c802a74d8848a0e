//! The `Castling` structure, tracking which castling rights are still held
//! by each player.
//!
//! A [`Castling`] is a bitflags wrapper over a `u8`; it only records whether
//! a right has been lost (by the king or the relevant rook moving), not
//! whether castling is legal at this instant -- that additionally depends on
//! attacked/occupied squares, computed by move generation.

use crate::core::masks::*;
use crate::core::sq::SQ;
use crate::core::{CastleType, Player};
use std::fmt;

use bitflags::bitflags;

const ALL_CASTLING: u8 = 0b0000_1111;

bitflags! {
    /// Tracks, per player and per side, whether the king and that side's rook
    /// have never moved. Does not imply castling is currently legal.
    #[derive(Default)]
    pub struct Castling: u8 {
        const WHITE_K   = C_WHITE_K_MASK;
        const WHITE_Q   = C_WHITE_Q_MASK;
        const BLACK_K   = C_BLACK_K_MASK;
        const BLACK_Q   = C_BLACK_Q_MASK;
        const WHITE_ALL = Self::WHITE_K.bits() | Self::WHITE_Q.bits();
        const BLACK_ALL = Self::BLACK_K.bits() | Self::BLACK_Q.bits();
    }
}

impl Castling {
    /// Removes all castling possibility for a single player.
    #[inline]
    pub fn remove_player_castling(&mut self, player: Player) {
        match player {
            Player::White => *self &= Self::BLACK_ALL,
            Player::Black => *self &= Self::WHITE_ALL,
        }
    }

    #[inline]
    pub const fn all_castling() -> Self {
        Castling::from_bits_truncate(ALL_CASTLING)
    }

    #[inline]
    pub const fn empty_set() -> Self {
        Castling::from_bits_truncate(0)
    }

    /// Removes king-side castling possibility for a single player.
    #[inline]
    pub fn remove_king_side_castling(&mut self, player: Player) {
        match player {
            Player::White => self.remove(Self::WHITE_K),
            Player::Black => self.remove(Self::BLACK_K),
        }
    }

    /// Removes queen-side castling possibility for a single player.
    #[inline]
    pub fn remove_queen_side_castling(&mut self, player: Player) {
        match player {
            Player::White => self.remove(Self::WHITE_Q),
            Player::Black => self.remove(Self::BLACK_Q),
        }
    }

    /// Returns whether a player still holds the right to castle on a given side.
    #[inline]
    pub fn castle_rights(self, player: Player, side: CastleType) -> bool {
        match player {
            Player::White => match side {
                CastleType::KingSide => self.contains(Self::WHITE_K),
                CastleType::QueenSide => self.contains(Self::WHITE_Q),
            },
            Player::Black => match side {
                CastleType::KingSide => self.contains(Self::BLACK_K),
                CastleType::QueenSide => self.contains(Self::BLACK_Q),
            },
        }
    }

    #[inline]
    pub fn player_can_castle(self, player: Player) -> Castling {
        Castling::from_bits_truncate(self.bits() & (Castling::WHITE_ALL.bits() >> (2 * player as u8)))
    }

    /// Returns true iff neither player retains any castling right.
    #[inline]
    pub fn no_castling(self) -> bool {
        self.is_empty()
    }

    /// Clears whatever castling rights are invalidated by a piece moving
    /// from `from` to `to` (covers both the king moving and either rook
    /// moving or being captured). Returns the bits actually cleared.
    #[inline]
    pub fn update_castling(&mut self, to: SQ, from: SQ) -> u8 {
        let mask_change: u8 = to.castle_rights_mask() | from.castle_rights_mask();
        let to_return: u8 = self.bits() & mask_change;
        *self &= Castling::from_bits_truncate(!mask_change);
        to_return
    }

    /// Adds the right to castle based on a FEN castling-field character.
    ///
    /// `K`/`Q`/`k`/`q` add the matching bit; `-` does nothing.
    ///
    /// # Panics
    /// Panics if the char is not one of `K`, `Q`, `k`, `q`, `-`.
    pub fn add_castling_char(&mut self, c: char) {
        let bit = match c {
            'K' => Castling::WHITE_K.bits(),
            'Q' => Castling::WHITE_Q.bits(),
            'k' => Castling::BLACK_K.bits(),
            'q' => Castling::BLACK_Q.bits(),
            '-' => 0,
            _ => panic!("illegal castling char: {}", c),
        };
        *self = Castling::from_bits_truncate(self.bits() | bit);
    }

    /// Renders the FEN castling-availability field, e.g. `"KQkq"` or `"-"`.
    pub fn pretty_string(self) -> String {
        if self.no_castling() {
            "-".to_owned()
        } else {
            let mut s = String::new();
            if self.contains(Castling::WHITE_K) {
                s.push('K');
            }
            if self.contains(Castling::WHITE_Q) {
                s.push('Q');
            }
            if self.contains(Castling::BLACK_K) {
                s.push('k');
            }
            if self.contains(Castling::BLACK_Q) {
                s.push('q');
            }
            s
        }
    }
}

impl fmt::Display for Castling {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn const_test() {
        let c = Castling::all();
        let c_const = Castling::all_castling();
        assert_eq!(c, c_const);
    }

    #[test]
    fn update_castling_clears_only_touched_rights() {
        let mut c = Castling::all_castling();
        c.update_castling(SQ::NONE, SQ::E1);
        assert!(!c.contains(Castling::WHITE_K));
        assert!(!c.contains(Castling::WHITE_Q));
        assert!(c.contains(Castling::BLACK_K));
        assert!(c.contains(Castling::BLACK_Q));
    }

    #[test]
    fn fen_round_trip() {
        let mut c = Castling::empty_set();
        for ch in ['K', 'q'] {
            c.add_castling_char(ch);
        }
        assert_eq!(c.pretty_string(), "Kq");
    }
}
