//! [`Board`]: the mutable chess position at the center of this crate.
//!
//! A `Board` owns the bitboard and mailbox representations of the pieces,
//! the Zobrist hash, and a stack of [`BoardState`] snapshots -- one pushed
//! per ply played, popped again on [`Board::undo_move`]. Move generation
//! lives in [`movegen`]; FEN parsing in [`fen`]; castling-rights tracking in
//! [`castle_rights`].

pub mod board_state;
pub mod castle_rights;
pub mod fen;
pub mod movegen;
pub mod perft;
pub mod piece_locations;

use std::fmt;

use thiserror::Error;

use crate::core::bitboard::BitBoard;
use crate::core::masks::*;
use crate::core::mono_traits::*;
use crate::core::move_list::MoveList;
use crate::core::piece_move::{BitMove, MoveType};
use crate::core::sq::{NO_SQ, SQ};
use crate::core::{CastleType, GenTypes, Piece, PieceType, Player, Rank};
use crate::helper::{zobrist, Helper};
use crate::nnue::{Accumulator, FeaturePiece};
use crate::tools::prng::PRNG;

use self::board_state::BoardState;
use self::castle_rights::Castling;
use self::movegen::{Legal, MoveGen, PseudoLegal};
pub use self::piece_locations::{FenBuildError, PieceLocations};

pub use self::fen::OPENING_POS_FEN;

/// Position-consistency failures caught by [`Board::is_okay`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("expected exactly one {player:?} king on the board, found {num}")]
    IncorrectKingNum { player: Player, num: u8 },
}

/// The chess position itself: piece placement, side to move, and the
/// [`BoardState`] stack of per-ply metadata.
#[derive(Clone)]
pub struct Board {
    turn: Player,
    bit_boards: [[BitBoard; PIECE_TYPE_CNT]; PLAYER_CNT],
    occ: [BitBoard; PLAYER_CNT],
    occ_all: BitBoard,
    piece_locations: PieceLocations,
    piece_counts: [[u8; PIECE_TYPE_CNT]; PLAYER_CNT],
    /// Absolute ply count (as encoded by the originating FEN's fullmove
    /// number) at which this board's history stack begins.
    ply_offset: u16,
    history: Vec<BoardState>,
}

impl Board {
    /// The standard chess starting position.
    pub fn start_pos() -> Board {
        Board::from_fen(OPENING_POS_FEN).expect("opening FEN is always valid")
    }

    /// A random legal position, for fuzzing move generation and perft.
    pub fn random() -> RandBoard {
        RandBoard::default()
    }

    #[inline]
    fn state(&self) -> &BoardState {
        self.history.last().expect("history is never empty")
    }

    #[inline]
    fn state_mut(&mut self) -> &mut BoardState {
        self.history.last_mut().expect("history is never empty")
    }

    /// A cheap copy usable for search (e.g. to explore a line without
    /// disturbing the caller's board). Unlike the tree-sharing `Arc<BoardState>`
    /// design this crate once used, this simply clones the whole history
    /// stack; see [`board_state`] for why that tradeoff was made.
    pub fn shallow_clone(&self) -> Board {
        self.clone()
    }

    /// Identical to [`Board::shallow_clone`]; kept as a separate name for
    /// call sites that want to document "this copy will be sent to another
    /// thread" even though, with an owned history stack, there is nothing
    /// thread-unsafe left to work around.
    pub fn parallel_clone(&self) -> Board {
        self.clone()
    }

    /// Parses a FEN string into a `Board`.
    ///
    /// # Examples
    ///
    /// ```
    /// use corvid_core::Board;
    /// let board = Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
    /// assert_eq!(board.generate_moves().len(), 20);
    /// ```
    pub fn from_fen(fen_str: &str) -> Result<Board, FenBuildError> {
        let sections: Vec<&str> = fen_str.split_whitespace().collect();
        if sections.len() != 6 {
            return Err(FenBuildError::NotEnoughSections {
                sections: sections.len(),
            });
        }

        let ranks: Vec<&str> = sections[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenBuildError::IncorrectRankAmounts { ranks: ranks.len() });
        }
        let mut piece_locations = PieceLocations::blank();
        piece_locations.from_partial_fen(ranks.as_slice())?;

        let turn_char = sections[1]
            .chars()
            .next()
            .ok_or_else(|| FenBuildError::UnrecognizedTurn {
                turn: sections[1].to_string(),
            })?;
        let turn = match turn_char {
            'w' => Player::White,
            'b' => Player::Black,
            _ => {
                return Err(FenBuildError::UnrecognizedTurn {
                    turn: sections[1].to_string(),
                })
            }
        };

        let mut castling = Castling::empty_set();
        for c in sections[2].chars() {
            castling.add_castling_char(c);
        }

        let ep_square = parse_ep_square(sections[3])?;
        let rule_50: i16 = sections[4].parse()?;
        let fullmove: u16 = sections[5].parse()?;
        let ply_offset = fullmove.saturating_sub(1) * 2 + (turn == Player::Black) as u16;

        let mut bit_boards = [[BitBoard(0); PIECE_TYPE_CNT]; PLAYER_CNT];
        let mut occ = [BitBoard(0); PLAYER_CNT];
        let mut occ_all = BitBoard(0);
        let mut piece_counts = [[0u8; PIECE_TYPE_CNT]; PLAYER_CNT];
        for i in 0..SQ_CNT as u8 {
            let sq = SQ(i);
            if let Some((player, pt)) = piece_locations.player_piece_at(sq) {
                let bb = sq.to_bb();
                bit_boards[player as usize][pt as usize] |= bb;
                occ[player as usize] |= bb;
                occ_all |= bb;
                piece_counts[player as usize][pt as usize] += 1;
            }
        }

        let mut state = BoardState::blank();
        state.castling = castling;
        state.rule_50 = rule_50;
        state.ep_square = ep_square;

        let mut board = Board {
            turn,
            bit_boards,
            occ,
            occ_all,
            piece_locations,
            piece_counts,
            ply_offset,
            history: vec![state],
        };

        board.set_check_info();
        let checkers = board.compute_checkers();
        board.state_mut().checkers_bb = checkers;
        board.refresh_accumulator();
        board.set_zob_hash();

        fen::is_valid_fen(board)
    }

    /// Renders this position as a FEN string.
    ///
    /// # Examples
    ///
    /// ```
    /// use corvid_core::Board;
    /// let board = Board::start_pos();
    /// assert_eq!(board.get_fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    /// ```
    pub fn get_fen(&self) -> String {
        let mut s = String::new();
        let mut blanks = 0u32;
        for idx in 0..SQ_CNT as u8 {
            let sq = SQ((idx % 8) + (8 * (7 - (idx / 8))));
            if sq.file() == crate::core::File::A && sq.rank() != Rank::R8 {
                if blanks != 0 {
                    s.push(std::char::from_digit(blanks, 10).unwrap());
                    blanks = 0;
                }
                s.push('/');
            }
            let piece = self.piece_at_sq(sq);
            if piece == Piece::None {
                blanks += 1;
            } else {
                if blanks != 0 {
                    s.push(std::char::from_digit(blanks, 10).unwrap());
                    blanks = 0;
                }
                s.push(piece.character_lossy());
            }
        }
        if blanks != 0 {
            s.push(std::char::from_digit(blanks, 10).unwrap());
        }

        s.push(' ');
        s.push(match self.turn {
            Player::White => 'w',
            Player::Black => 'b',
        });
        s.push(' ');
        s.push_str(&self.state().castling.pretty_string());
        s.push(' ');
        if self.ep_square() == NO_SQ {
            s.push('-');
        } else {
            s.push_str(&self.ep_square().to_string());
        }
        s.push(' ');
        s.push_str(&self.rule_50().to_string());
        s.push(' ');
        s.push_str(&self.fullmove_number().to_string());
        s
    }

    fn fullmove_number(&self) -> u16 {
        (self.ply_offset + self.state().ply) / 2 + 1
    }

    //  ------- MOVE APPLICATION -------

    /// Plays a move, pushing a new [`BoardState`] for it.
    ///
    /// # Panics
    /// Panics if `bit_move` is not legal for the current position.
    pub fn apply_move(&mut self, bit_move: BitMove) {
        let gives_check = self.gives_check(bit_move);
        self.apply_unknown_move(bit_move, gives_check);
    }

    /// Identical to [`Board::apply_move`], except the caller supplies whether
    /// the move gives check (when already known, this saves recomputing it).
    ///
    /// # Safety (contract, not memory safety)
    /// `gives_check` must match [`Board::gives_check`] for this move, or the
    /// resulting `checkers()` will be wrong.
    pub fn apply_unknown_move(&mut self, bit_move: BitMove, gives_check: bool) {
        assert_ne!(bit_move.get_src(), bit_move.get_dest());

        let us = self.turn;
        let them = us.other_player();
        let from = bit_move.get_src();
        let mut to = bit_move.get_dest();
        let piece = self.piece_at_sq(from).type_of();
        assert_eq!(self.player_at_sq(from), Some(us));

        let captured_type = if bit_move.is_en_passant() {
            Some(PieceType::P)
        } else {
            let p = self.piece_at_sq(to);
            if p == Piece::None {
                None
            } else {
                Some(p.type_of())
            }
        };

        let old_castling_bits = self.state().castling.bits();
        let mut zob = self.state().zobrist ^ zobrist::z_side();
        let mut new_state = self.state().partial_clone();
        new_state.rule_50 += 1;
        new_state.ply += 1;
        new_state.prev_move = bit_move;
        self.history.push(new_state);

        if bit_move.is_castle() {
            assert_eq!(captured_type, Some(PieceType::R));
            assert_eq!(piece, PieceType::K);
            let r_src = to;
            let king_side = from < r_src;
            let k_dst = us.relative_square(if king_side { SQ::G1 } else { SQ::C1 });
            let r_dst = us.relative_square(if king_side { SQ::F1 } else { SQ::D1 });

            zob ^= zobrist::z_square(r_src, Piece::make_lossy(us, PieceType::R))
                ^ zobrist::z_square(r_dst, Piece::make_lossy(us, PieceType::R));

            self.move_piece_c(PieceType::K, from, k_dst, us);
            self.move_piece_c(PieceType::R, r_src, r_dst, us);
            to = k_dst;
            self.state_mut().captured_piece = None;
        } else if let Some(cap_pt) = captured_type {
            let mut cap_sq = to;
            if bit_move.is_en_passant() {
                assert_eq!(piece, PieceType::P);
                cap_sq = SQ((to.0 as i8).wrapping_sub(us.pawn_push()) as u8);
                assert_eq!(self.player_at_sq(cap_sq), Some(them));
                assert_eq!(self.piece_at_sq(cap_sq).type_of(), PieceType::P);
            }
            zob ^= zobrist::z_square(cap_sq, Piece::make_lossy(them, cap_pt));
            self.remove_piece_c(cap_pt, cap_sq, them);
            let st = self.state_mut();
            st.rule_50 = 0;
            st.captured_piece = Some(cap_pt);
        }

        if !bit_move.is_castle() {
            zob ^= zobrist::z_square(from, Piece::make_lossy(us, piece))
                ^ zobrist::z_square(to, Piece::make_lossy(us, piece));
            self.move_piece_c(piece, from, to, us);
        }

        if self.state().ep_square != NO_SQ {
            zob ^= zobrist::z_ep(self.state().ep_square);
            self.state_mut().ep_square = NO_SQ;
        }

        if piece == PieceType::P {
            if from.distance(to) == 2 && from.file() == to.file() {
                let ep_sq = SQ((from.0 + to.0) / 2);
                self.state_mut().ep_square = ep_sq;
                zob ^= zobrist::z_ep(ep_sq);
            } else if bit_move.is_promo() {
                let promo = bit_move.promo_piece();
                self.remove_piece_c(PieceType::P, to, us);
                self.put_piece_c(promo, to, us);
                zob ^= zobrist::z_square(to, Piece::make_lossy(us, PieceType::P))
                    ^ zobrist::z_square(to, Piece::make_lossy(us, promo));
            }
            self.state_mut().rule_50 = 0;
        }

        let new_castling_bits = {
            let to = to;
            let from = from;
            let st = self.state_mut();
            st.castling.update_castling(to, from);
            st.castling.bits()
        };
        if new_castling_bits != old_castling_bits {
            zob ^= zobrist::z_castle(old_castling_bits) ^ zobrist::z_castle(new_castling_bits);
        }

        let irreversible = bit_move.is_capture() || piece == PieceType::P || bit_move.is_castle();
        self.turn = them;
        let new_len = self.history.len() as u16;
        if irreversible {
            self.state_mut().last_irreversible = new_len - 1;
        }

        self.state_mut().zobrist = zob;
        self.set_check_info();
        self.state_mut().checkers_bb = if gives_check {
            self.compute_checkers()
        } else {
            BitBoard(0)
        };

        debug_assert!(self.is_okay().is_ok());
    }

    /// Plays a move given in UCI notation (e.g. `"e2e4"`, `"e7e8q"`),
    /// returning whether a matching legal move was found and applied.
    pub fn apply_uci_move(&mut self, uci_move: &str) -> bool {
        let moves = self.generate_moves();
        if let Some(mov) = moves.iter().find(|m| m.stringify() == uci_move) {
            let mov = *mov;
            self.apply_move(mov);
            true
        } else {
            false
        }
    }

    /// Pops the most recent [`BoardState`], restoring the position to before
    /// its move was played.
    ///
    /// # Panics
    /// Panics if no move has been played on this board.
    pub fn undo_move(&mut self) {
        assert!(self.history.len() > 1, "cannot undo the starting position");
        let undone = self.state().prev_move;
        assert!(!undone.is_null());

        self.turn = self.turn.other_player();
        let us = self.turn;
        let from = undone.get_src();
        let to = undone.get_dest();

        if undone.is_castle() {
            let r_src = to;
            let king_side = from < r_src;
            let k_dst = us.relative_square(if king_side { SQ::G1 } else { SQ::C1 });
            let r_dst = us.relative_square(if king_side { SQ::F1 } else { SQ::D1 });
            self.move_piece_c(PieceType::K, k_dst, from, us);
            self.move_piece_c(PieceType::R, r_dst, r_src, us);
        } else {
            let mut moved_type = self.piece_at_sq(to).type_of();
            if undone.is_promo() {
                assert_eq!(moved_type, undone.promo_piece());
                self.remove_piece_c(moved_type, to, us);
                self.put_piece_c(PieceType::P, to, us);
                moved_type = PieceType::P;
            }
            self.move_piece_c(moved_type, to, from, us);

            if let Some(cap_pt) = self.history[self.history.len() - 1].captured_piece {
                let mut cap_sq = to;
                if undone.is_en_passant() {
                    cap_sq = SQ((to.0 as i8).wrapping_sub(us.pawn_push()) as u8);
                }
                self.put_piece_c(cap_pt, cap_sq, us.other_player());
            }
        }

        self.history.pop();
        debug_assert!(self.is_okay().is_ok());
    }

    /// Swaps the side to move without playing a move, for null-move pruning.
    ///
    /// # Panics
    /// Panics if the side to move is currently in check (a null move would
    /// otherwise "escape" the check, which is illegal).
    pub fn apply_null_move(&mut self) {
        assert!(self.checkers().is_empty());
        let mut zob = self.state().zobrist ^ zobrist::z_side();
        let mut new_state = self.state().partial_clone();
        new_state.rule_50 += 1;
        new_state.ply += 1;
        new_state.prev_move = BitMove::null();
        if new_state.ep_square != NO_SQ {
            zob ^= zobrist::z_ep(new_state.ep_square);
            new_state.ep_square = NO_SQ;
        }
        new_state.zobrist = zob;
        self.history.push(new_state);
        self.turn = self.turn.other_player();
        self.set_check_info();
    }

    /// Undoes a move played with [`Board::apply_null_move`].
    ///
    /// # Panics
    /// Panics if the last move played was not a null move.
    pub fn undo_null_move(&mut self) {
        assert!(self.state().prev_move.is_null());
        self.history.pop();
        self.turn = self.turn.other_player();
    }

    //  ------- MOVE GENERATION -------

    /// All legal moves for the side to move.
    pub fn generate_moves(&self) -> MoveList {
        MoveGen::generate::<Legal, AllGenType>(self)
    }

    /// All pseudo-legal moves for the side to move; callers must verify each
    /// with [`Board::legal_move`] before playing it.
    pub fn generate_pseudolegal_moves(&self) -> MoveList {
        MoveGen::generate::<PseudoLegal, AllGenType>(self)
    }

    /// Legal moves of a particular [`GenTypes`] subset.
    pub fn generate_moves_of_type(&self, gen_type: GenTypes) -> MoveList {
        match gen_type {
            GenTypes::All => MoveGen::generate::<Legal, AllGenType>(self),
            GenTypes::Captures => MoveGen::generate::<Legal, CapturesGenType>(self),
            GenTypes::Quiets => MoveGen::generate::<Legal, QuietsGenType>(self),
            GenTypes::QuietChecks => MoveGen::generate::<Legal, QuietChecksGenType>(self),
            GenTypes::Evasions => MoveGen::generate::<Legal, EvasionsGenType>(self),
            GenTypes::NonEvasions => MoveGen::generate::<Legal, NonEvasionsGenType>(self),
        }
    }

    /// Pseudo-legal moves of a particular [`GenTypes`] subset.
    pub fn generate_pseudolegal_moves_of_type(&self, gen_type: GenTypes) -> MoveList {
        match gen_type {
            GenTypes::All => MoveGen::generate::<PseudoLegal, AllGenType>(self),
            GenTypes::Captures => MoveGen::generate::<PseudoLegal, CapturesGenType>(self),
            GenTypes::Quiets => MoveGen::generate::<PseudoLegal, QuietsGenType>(self),
            GenTypes::QuietChecks => MoveGen::generate::<PseudoLegal, QuietChecksGenType>(self),
            GenTypes::Evasions => MoveGen::generate::<PseudoLegal, EvasionsGenType>(self),
            GenTypes::NonEvasions => MoveGen::generate::<PseudoLegal, NonEvasionsGenType>(self),
        }
    }

    //  ------- PRIVATE MUTATORS -------

    fn set_check_info(&mut self) {
        let h = Helper::new();
        let mut white_pinners = BitBoard(0);
        let white_blockers =
            self.slider_blockers(self.occupied_black(), self.king_sq(Player::White), &mut white_pinners);
        let mut black_pinners = BitBoard(0);
        let black_blockers =
            self.slider_blockers(self.occupied_white(), self.king_sq(Player::Black), &mut black_pinners);

        let them = self.turn.other_player();
        let ksq = self.king_sq(them);
        let occupied = self.occupied();
        let check_p = h.pawn_attacks_from(ksq, them);
        let check_n = h.knight_moves(ksq);
        let check_b = h.bishop_moves(occupied, ksq);
        let check_r = h.rook_moves(occupied, ksq);
        let check_q = check_b | check_r;

        let st = self.state_mut();
        st.blockers_king[Player::White as usize] = white_blockers;
        st.pinners_king[Player::White as usize] = white_pinners;
        st.blockers_king[Player::Black as usize] = black_blockers;
        st.pinners_king[Player::Black as usize] = black_pinners;
        st.check_sqs[PieceType::P as usize] = check_p;
        st.check_sqs[PieceType::N as usize] = check_n;
        st.check_sqs[PieceType::B as usize] = check_b;
        st.check_sqs[PieceType::R as usize] = check_r;
        st.check_sqs[PieceType::Q as usize] = check_q;
        st.check_sqs[PieceType::K as usize] = BitBoard(0);
    }

    fn compute_checkers(&self) -> BitBoard {
        self.attackers_to(self.king_sq(self.turn), self.occupied())
            & self.get_occupied_player(self.turn.other_player())
    }

    fn remove_piece_c(&mut self, piece_type: PieceType, square: SQ, player: Player) {
        debug_assert_eq!(self.piece_locations.piece_at(square), piece_type);
        let bb = square.to_bb();
        self.occ_all ^= bb;
        self.occ[player as usize] ^= bb;
        self.bit_boards[player as usize][piece_type as usize] ^= bb;
        self.piece_locations.remove(square);
        self.piece_counts[player as usize][piece_type as usize] -= 1;
        if piece_type == PieceType::K {
            self.refresh_accumulator();
        } else {
            let (wk, bk) = (self.king_sq(Player::White), self.king_sq(Player::Black));
            self.state_mut().accumulator.remove_piece(wk, bk, player, piece_type, square);
        }
    }

    fn put_piece_c(&mut self, piece_type: PieceType, square: SQ, player: Player) {
        let bb = square.to_bb();
        self.occ_all |= bb;
        self.occ[player as usize] |= bb;
        self.bit_boards[player as usize][piece_type as usize] |= bb;
        self.piece_locations.place(square, player, piece_type);
        self.piece_counts[player as usize][piece_type as usize] += 1;
        if piece_type == PieceType::K {
            self.refresh_accumulator();
        } else {
            let (wk, bk) = (self.king_sq(Player::White), self.king_sq(Player::Black));
            self.state_mut().accumulator.add_piece(wk, bk, player, piece_type, square);
        }
    }

    fn move_piece_c(&mut self, piece_type: PieceType, from: SQ, to: SQ, player: Player) {
        assert_ne!(from, to);
        let comb_bb = from.to_bb() | to.to_bb();
        self.occ_all ^= comb_bb;
        self.occ[player as usize] ^= comb_bb;
        self.bit_boards[player as usize][piece_type as usize] ^= comb_bb;
        self.piece_locations.remove(from);
        self.piece_locations.place(to, player, piece_type);

        if piece_type == PieceType::K {
            self.refresh_accumulator();
        } else {
            let (wk, bk) = (self.king_sq(Player::White), self.king_sq(Player::Black));
            let st = self.state_mut();
            st.accumulator.remove_piece(wk, bk, player, piece_type, from);
            st.accumulator.add_piece(wk, bk, player, piece_type, to);
        }
    }

    fn refresh_accumulator(&mut self) {
        let wk = self.king_sq(Player::White);
        let bk = self.king_sq(Player::Black);
        let mut pieces = Vec::with_capacity(32);
        for i in 0..SQ_CNT as u8 {
            let sq = SQ(i);
            if let Some((player, piece_type)) = self.piece_locations.player_piece_at(sq) {
                pieces.push(FeaturePiece { sq, player, piece_type });
            }
        }
        self.state_mut().accumulator.refresh(wk, bk, &pieces);
    }

    /// Returns the squares between the king and any attacker that would be
    /// pinned if a single one of our own pieces sat on the line; `pinners`
    /// is filled with the attacking sliders doing the pinning.
    fn slider_blockers(&self, sliders: BitBoard, ksq: SQ, pinners: &mut BitBoard) -> BitBoard {
        let h = Helper::new();
        let mut result = BitBoard(0);
        *pinners = BitBoard(0);
        let occupied = self.occupied();

        let mut snipers = sliders
            & ((h.rook_moves(BitBoard(0), ksq) & self.piece_two_bb_both_players(PieceType::R, PieceType::Q))
                | (h.bishop_moves(BitBoard(0), ksq)
                    & self.piece_two_bb_both_players(PieceType::B, PieceType::Q)));

        while snipers.is_not_empty() {
            let sniper_sq = snipers.pop_lsb();
            let between = h.between_bb(ksq, sniper_sq) & occupied;
            if !between.more_than_one() {
                result |= between;
                if let Some(defender) = self.player_at_sq(ksq) {
                    if (between & self.get_occupied_player(defender)).is_not_empty() {
                        *pinners |= sniper_sq.to_bb();
                    }
                }
            }
        }
        result
    }

    fn set_zob_hash(&mut self) {
        let mut zob = 0u64;
        let mut b = self.occupied();
        while b.is_not_empty() {
            let sq = b.pop_lsb();
            let piece = self.piece_at_sq(sq);
            zob ^= zobrist::z_square(sq, piece);
        }
        let ep = self.state().ep_square;
        if ep != NO_SQ && ep.is_okay() {
            zob ^= zobrist::z_ep(ep);
        }
        zob ^= zobrist::z_castle(self.state().castling.bits());
        if self.turn == Player::Black {
            zob ^= zobrist::z_side();
        }
        self.state_mut().zobrist = zob;
    }
}

fn parse_ep_square(field: &str) -> Result<SQ, FenBuildError> {
    if field == "-" {
        return Ok(NO_SQ);
    }
    let mut chars = field.chars();
    let file_c = chars.next().ok_or_else(|| FenBuildError::EPSquareUnreadable {
        ep: field.to_string(),
    })?;
    let rank_c = chars.next().ok_or_else(|| FenBuildError::EPSquareUnreadable {
        ep: field.to_string(),
    })?;
    if chars.next().is_some() {
        return Err(FenBuildError::EPSquareUnreadable { ep: field.to_string() });
    }
    let file = match file_c {
        'a'..='h' => file_c as u8 - b'a',
        _ => return Err(FenBuildError::EPSquareUnreadable { ep: field.to_string() }),
    };
    let rank = match rank_c {
        '3' => 2,
        '6' => 5,
        _ => return Err(FenBuildError::EPSquareInvalid { ep: field.to_string() }),
    };
    Ok(SQ(rank * 8 + file))
}

// ------- READ-ONLY QUERIES -------

impl Board {
    /// The side to move.
    #[inline(always)]
    pub fn turn(&self) -> Player {
        self.turn
    }

    /// The current Zobrist hash, incorporating pieces, side to move,
    /// castling rights, and the en-passant file.
    #[inline(always)]
    pub fn zobrist(&self) -> u64 {
        self.state().zobrist
    }

    /// The NNUE evaluation of this position from the side to move's point of
    /// view, in centipawns. Falls back to a direct endgame heuristic for bare
    /// king-vs-major-piece positions, which the network extrapolates poorly.
    pub fn evaluate(&self) -> crate::core::score::Value {
        let wk = self.king_sq(Player::White);
        let bk = self.king_sq(Player::Black);
        if self.count_all_pieces() <= 3 {
            let white_major = self.count_piece(Player::White, PieceType::Q) > 0
                || self.count_piece(Player::White, PieceType::R) > 0;
            let black_major = self.count_piece(Player::Black, PieceType::Q) > 0
                || self.count_piece(Player::Black, PieceType::R) > 0;
            if white_major && !black_major && self.count_all_pieces() == 3 {
                if let Some(v) = crate::nnue::basic_mating_shortcut(
                    wk,
                    bk,
                    true,
                    self.turn() == Player::White,
                ) {
                    return if self.turn() == Player::White { v } else { -v };
                }
            } else if black_major && !white_major && self.count_all_pieces() == 3 {
                if let Some(v) = crate::nnue::basic_mating_shortcut(
                    bk,
                    wk,
                    true,
                    self.turn() == Player::Black,
                ) {
                    return if self.turn() == Player::Black { v } else { -v };
                }
            }
        }
        self.state().accumulator.evaluate(self.turn())
    }

    /// Plies played since this `Board` was constructed (not the absolute
    /// game ply if parsed from a FEN with a nonzero fullmove number).
    #[inline(always)]
    pub fn moves_played(&self) -> u16 {
        self.state().ply
    }

    /// Alias of [`Board::moves_played`], kept for call sites that think in
    /// terms of search depth rather than ply count.
    #[inline(always)]
    pub fn depth(&self) -> u16 {
        self.state().ply
    }

    /// Plies since the last capture or pawn push.
    #[inline(always)]
    pub fn rule_50(&self) -> i16 {
        self.state().rule_50
    }

    /// True if the current position's Zobrist hash already occurred earlier
    /// in the game, at or after the last irreversible move. Only hashes an
    /// even number of plies back are compared, since those are the only ones
    /// with the same side to move.
    pub fn is_repetition(&self) -> bool {
        let cur_idx = self.history.len() - 1;
        let floor = self.state().last_irreversible as usize;
        if cur_idx < 4 || floor + 4 > cur_idx {
            return false;
        }
        let cur_hash = self.state().zobrist;
        let mut idx = cur_idx - 4;
        loop {
            if self.history[idx].zobrist == cur_hash {
                return true;
            }
            if idx < floor + 2 || idx < 2 {
                break;
            }
            idx -= 2;
        }
        false
    }

    /// True if the position should be scored as a draw by the fifty-move
    /// rule or repetition. Checked before move generation, so it does not
    /// distinguish a drawn rule-50 position from one that happens to also
    /// be checkmate -- callers test for that separately once they have the
    /// move list.
    pub fn is_draw(&self) -> bool {
        self.rule_50() >= 99 || self.is_repetition()
    }

    /// The piece captured to reach the current position, if any.
    #[inline(always)]
    pub fn piece_captured_last_turn(&self) -> Option<Piece> {
        self.state()
            .captured_piece
            .map(|pt| Piece::make_lossy(self.turn, pt))
    }

    /// Alias of [`Board::piece_captured_last_turn`].
    #[inline(always)]
    pub fn piece_last_captured(&self) -> Option<Piece> {
        self.piece_captured_last_turn()
    }

    /// Plies since this `Board` was constructed. See [`Board::moves_played`].
    #[inline(always)]
    pub fn ply(&self) -> u16 {
        self.state().ply
    }

    /// The en-passant target square, or [`NO_SQ`] if none is available.
    #[inline(always)]
    pub fn ep_square(&self) -> SQ {
        self.state().ep_square
    }

    /// All occupied squares, both players.
    #[inline(always)]
    pub fn occupied(&self) -> BitBoard {
        self.occ_all
    }

    /// All squares occupied by `player`.
    #[inline(always)]
    pub fn get_occupied_player(&self, player: Player) -> BitBoard {
        self.occ[player as usize]
    }

    #[inline(always)]
    pub fn occupied_white(&self) -> BitBoard {
        self.occ[Player::White as usize]
    }

    #[inline(always)]
    pub fn occupied_black(&self) -> BitBoard {
        self.occ[Player::Black as usize]
    }

    /// Squares occupied by `player`'s pieces of type `piece_type`.
    #[inline(always)]
    pub fn piece_bb(&self, player: Player, piece_type: PieceType) -> BitBoard {
        self.bit_boards[player as usize][piece_type as usize]
    }

    /// Rooks and queens belonging to `player` (pieces that slide orthogonally).
    #[inline(always)]
    pub fn sliding_piece_bb(&self, player: Player) -> BitBoard {
        self.piece_bb(player, PieceType::R) | self.piece_bb(player, PieceType::Q)
    }

    /// Bishops and queens belonging to `player` (pieces that slide diagonally).
    #[inline(always)]
    pub fn diagonal_piece_bb(&self, player: Player) -> BitBoard {
        self.piece_bb(player, PieceType::B) | self.piece_bb(player, PieceType::Q)
    }

    /// Squares holding a piece of `piece_type`, for either player.
    #[inline(always)]
    pub fn piece_bb_both_players(&self, piece_type: PieceType) -> BitBoard {
        self.piece_bb(Player::White, piece_type) | self.piece_bb(Player::Black, piece_type)
    }

    #[inline(always)]
    pub fn piece_two_bb_both_players(&self, pt1: PieceType, pt2: PieceType) -> BitBoard {
        self.piece_bb_both_players(pt1) | self.piece_bb_both_players(pt2)
    }

    #[inline(always)]
    pub fn piece_two_bb(&self, pt1: PieceType, pt2: PieceType, player: Player) -> BitBoard {
        self.piece_bb(player, pt1) | self.piece_bb(player, pt2)
    }

    #[inline(always)]
    pub fn count_piece(&self, player: Player, piece_type: PieceType) -> u8 {
        self.piece_counts[player as usize][piece_type as usize]
    }

    pub fn count_pieces_player(&self, player: Player) -> u8 {
        crate::core::ALL_PIECE_TYPES
            .iter()
            .map(|&pt| self.count_piece(player, pt))
            .sum()
    }

    pub fn count_all_pieces(&self) -> u8 {
        self.count_pieces_player(Player::White) + self.count_pieces_player(Player::Black)
    }

    /// The piece sitting on `sq`, or [`Piece::None`] if it's empty.
    #[inline(always)]
    pub fn piece_at_sq(&self, sq: SQ) -> Piece {
        self.piece_locations.at_square(sq)
    }

    #[inline(always)]
    pub fn color_of_sq(&self, sq: SQ) -> Option<Player> {
        self.piece_locations.player_at(sq)
    }

    #[inline(always)]
    pub fn player_at_sq(&self, sq: SQ) -> Option<Player> {
        self.piece_locations.player_at(sq)
    }

    /// The square `player`'s king sits on.
    #[inline(always)]
    pub fn king_sq(&self, player: Player) -> SQ {
        self.piece_bb(player, PieceType::K).to_sq()
    }

    /// `player`'s pieces that, if moved, would expose their own king to check.
    #[inline(always)]
    pub fn pinned_pieces(&self, player: Player) -> BitBoard {
        self.state().blockers_king[player as usize] & self.get_occupied_player(player)
    }

    /// Alias of [`Board::pinned_pieces`].
    #[inline(always)]
    pub fn pieces_pinned(&self, player: Player) -> BitBoard {
        self.pinned_pieces(player)
    }

    #[inline(always)]
    pub fn pinning_pieces(&self, player: Player) -> BitBoard {
        self.state().pinners_king[player as usize]
    }

    /// `self.turn`'s pieces that are blocking a check against the opponent's
    /// king, i.e. would give discovered check if moved off that line.
    #[inline(always)]
    pub fn discovered_check_candidates(&self) -> BitBoard {
        self.state().blockers_king[self.turn.other_player() as usize] & self.get_occupied_player(self.turn)
    }

    #[inline(always)]
    pub fn can_castle(&self, player: Player, castle_type: CastleType) -> bool {
        self.state().castling.castle_rights(player, castle_type)
    }

    #[inline(always)]
    pub fn player_can_castle(&self, player: Player) -> Castling {
        self.state().castling.player_can_castle(player)
    }

    /// Whether any square between the king and rook for `self.turn`'s
    /// `castle_type` side is currently occupied.
    #[inline(always)]
    pub fn castle_impeded(&self, castle_type: CastleType) -> bool {
        let path = BitBoard(CASTLING_PATH[self.turn as usize][castle_type as usize]);
        (path & self.occ_all).is_not_empty()
    }

    #[inline(always)]
    pub fn castling_rook_square(&self, castle_type: CastleType) -> SQ {
        SQ(CASTLING_ROOK_START[self.turn as usize][castle_type as usize])
    }

    /// The most recently played move, if any.
    pub fn last_move(&self) -> Option<BitMove> {
        if self.state().prev_move.is_null() {
            None
        } else {
            Some(self.state().prev_move)
        }
    }

    /// Heuristic: true once `player` has lost both castling rights and its
    /// king has left its starting square, which is how this crate detects a
    /// completed castle after the fact (it does not keep a dedicated flag).
    pub fn has_castled(&self, player: Player) -> bool {
        let start = player.relative_square(SQ::E1);
        self.king_sq(player) != start
            && !self.can_castle(player, CastleType::KingSide)
            && !self.can_castle(player, CastleType::QueenSide)
    }

    #[inline(always)]
    pub fn in_check(&self) -> bool {
        self.state().checkers_bb.is_not_empty()
    }

    /// Computationally expensive (calls [`Board::generate_moves`]); prefer
    /// checking search results for mate rather than calling this in a hot loop.
    pub fn checkmate(&self) -> bool {
        self.in_check() && self.generate_moves().is_empty()
    }

    /// True for a true stalemate only -- the fifty-move rule is tracked
    /// separately via [`Board::rule_50`].
    pub fn stalemate(&self) -> bool {
        !self.in_check() && self.generate_moves().is_empty()
    }

    #[inline(always)]
    pub fn checkers(&self) -> BitBoard {
        self.state().checkers_bb
    }

    /// All pieces (either player) attacking or defending `sq`, given a
    /// (possibly hypothetical) `occupied` bitboard.
    pub fn attackers_to(&self, sq: SQ, occupied: BitBoard) -> BitBoard {
        let h = Helper::new();
        (h.pawn_attacks_from(sq, Player::Black) & self.piece_bb(Player::White, PieceType::P))
            | (h.pawn_attacks_from(sq, Player::White) & self.piece_bb(Player::Black, PieceType::P))
            | (h.knight_moves(sq) & self.piece_bb_both_players(PieceType::N))
            | (h.rook_moves(occupied, sq)
                & (self.sliding_piece_bb(Player::White) | self.sliding_piece_bb(Player::Black)))
            | (h.bishop_moves(occupied, sq)
                & (self.diagonal_piece_bb(Player::White) | self.diagonal_piece_bb(Player::Black)))
            | (h.king_moves(sq) & self.piece_bb_both_players(PieceType::K))
    }

    /// Confirms a pseudo-legal move does not leave `self.turn`'s own king in
    /// check.
    pub fn legal_move(&self, m: BitMove) -> bool {
        if m.get_src() == m.get_dest() {
            return false;
        }
        let h = Helper::new();
        let them = self.turn.other_player();
        let src = m.get_src();
        let src_bb = src.to_bb();
        let dst = m.get_dest();

        if m.move_type() == MoveType::EnPassant {
            let ksq = self.king_sq(self.turn);
            let dst_bb = dst.to_bb();
            let captured_sq = SQ((dst.0 as i8).wrapping_sub(self.turn.pawn_push()) as u8);
            let occupied = (self.occupied() ^ src_bb ^ captured_sq.to_bb()) | dst_bb;
            return (h.rook_moves(occupied, ksq) & self.sliding_piece_bb(them)).is_empty()
                && (h.bishop_moves(occupied, ksq) & self.diagonal_piece_bb(them)).is_empty();
        }

        let piece = self.piece_at_sq(src);
        if piece == Piece::None {
            return false;
        }

        if piece.type_of() == PieceType::K {
            return m.move_type() == MoveType::Castle
                || (self.attackers_to(dst, self.occupied()) & self.get_occupied_player(them)).is_empty();
        }

        (self.pinned_pieces(self.turn) & src_bb).is_empty()
            || h.aligned(src, dst, self.king_sq(self.turn))
    }

    /// Whether a move is legal for the current position without first
    /// generating the full pseudo-legal move list -- used by callers (e.g.
    /// a transposition-table move) that already hold a candidate `BitMove`
    /// and just need to confirm it applies here.
    pub fn pseudo_legal_move(&self, m: BitMove) -> bool {
        let src = m.get_src();
        let dst = m.get_dest();
        if src == dst || !src.is_okay() || !dst.is_okay() {
            return false;
        }
        let piece = self.piece_at_sq(src);
        if piece == Piece::None || piece.player() != Some(self.turn) {
            return false;
        }
        if self.piece_at_sq(dst).player() == Some(self.turn) {
            return false;
        }
        self.generate_pseudolegal_moves().iter().any(|gm| *gm == m)
    }

    /// Whether playing `m` would give check to the opponent's king.
    pub fn gives_check(&self, m: BitMove) -> bool {
        let h = Helper::new();
        let src = m.get_src();
        let dst = m.get_dest();
        let src_bb = src.to_bb();
        let dst_bb = dst.to_bb();
        let opp_king_sq = self.king_sq(self.turn.other_player());

        assert_ne!(src, dst);
        assert_eq!(self.player_at_sq(src), Some(self.turn));

        if (self.state().check_sqs[self.piece_at_sq(src).type_of() as usize] & dst_bb).is_not_empty() {
            return true;
        }

        if (self.discovered_check_candidates() & src_bb).is_not_empty()
            && !h.aligned(src, dst, opp_king_sq)
        {
            return true;
        }

        match m.move_type() {
            MoveType::Normal => false,
            MoveType::Promotion => {
                let occ = self.occupied() ^ src_bb;
                let attacks = match m.promo_piece() {
                    PieceType::N => h.knight_moves(dst),
                    PieceType::B => h.bishop_moves(occ, dst),
                    PieceType::R => h.rook_moves(occ, dst),
                    PieceType::Q => h.queen_moves(occ, dst),
                    _ => unreachable!(),
                };
                (attacks & opp_king_sq.to_bb()).is_not_empty()
            }
            MoveType::EnPassant => {
                let captured_sq = SQ::make(dst.file(), src.rank());
                let occ = (self.occupied() ^ src_bb ^ captured_sq.to_bb()) | dst_bb;
                let sliding = self.sliding_piece_bb(self.turn);
                let diagonal = self.diagonal_piece_bb(self.turn);
                ((h.rook_moves(occ, opp_king_sq) & sliding) | (h.bishop_moves(occ, opp_king_sq) & diagonal))
                    .is_not_empty()
            }
            MoveType::Castle => {
                let k_from = src;
                let r_from = dst;
                let king_side = r_from > k_from;
                let k_to = self.turn.relative_square(if king_side { SQ::G1 } else { SQ::C1 });
                let r_to = self.turn.relative_square(if king_side { SQ::F1 } else { SQ::D1 });
                let opp_k_bb = opp_king_sq.to_bb();
                let occ_after = r_to.to_bb() | k_to.to_bb() | (self.occupied() ^ k_from.to_bb() ^ r_from.to_bb());
                (h.rook_moves(BitBoard(0), r_to) & opp_k_bb).is_not_empty()
                    && (h.rook_moves(occ_after, r_to) & opp_k_bb).is_not_empty()
            }
        }
    }

    /// The piece moved by `m`.
    ///
    /// # Panics
    /// Panics if `m`'s source square is empty.
    #[inline]
    pub fn moved_piece(&self, m: BitMove) -> Piece {
        let piece = self.piece_at_sq(m.get_src());
        assert_ne!(piece, Piece::None);
        piece
    }

    /// What `m` would capture, if anything (accounting for en passant).
    pub fn captured_piece(&self, m: BitMove) -> Option<Piece> {
        if m.is_en_passant() {
            return Some(Piece::make_lossy(self.turn.other_player(), PieceType::P));
        }
        let p = self.piece_at_sq(m.get_dest());
        if p == Piece::None {
            None
        } else {
            Some(p)
        }
    }

    /// A human-readable ASCII board diagram.
    pub fn pretty_string(&self) -> String {
        let mut s = String::new();
        for rank in (0..8u8).rev() {
            s.push_str(&format!("{} ", rank + 1));
            for file in 0..8u8 {
                let sq = SQ(rank * 8 + file);
                let piece = self.piece_at_sq(sq);
                s.push(if piece == Piece::None {
                    '.'
                } else {
                    piece.character_lossy()
                });
                s.push(' ');
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h\n");
        s
    }

    pub fn get_piece_locations(&self) -> PieceLocations {
        self.piece_locations
    }

    pub fn print_debug_info(&self) {
        println!("{}", self.pretty_string());
        println!("fen: {}", self.get_fen());
        println!("zobrist: {:x}", self.zobrist());
    }

    pub fn pretty_print(&self) {
        print!("{}", self.pretty_string());
    }
}

impl Board {
    /// Cheap structural sanity check, safe to call even in release builds.
    pub fn is_ok_quick(&self) -> bool {
        self.piece_at_sq(self.king_sq(Player::White)).type_of() == PieceType::K
            && self.piece_at_sq(self.king_sq(Player::Black)).type_of() == PieceType::K
            && (self.ep_square() == NO_SQ || self.turn.relative_rank_of_sq(self.ep_square()) == Rank::R6)
    }

    /// A thorough consistency check, intended for `debug_assert!` call sites.
    pub fn is_okay(&self) -> Result<(), BoardError> {
        let w = self.count_piece(Player::White, PieceType::K);
        if w != 1 {
            return Err(BoardError::IncorrectKingNum {
                player: Player::White,
                num: w,
            });
        }
        let b = self.count_piece(Player::Black, PieceType::K);
        if b != 1 {
            return Err(BoardError::IncorrectKingNum {
                player: Player::Black,
                num: b,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty_string())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Board({})", self.get_fen())
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Board) -> bool {
        self.zobrist() == other.zobrist()
    }
}

/// Which kind of random position [`RandBoard`] should produce.
#[derive(PartialEq, Eq, Copy, Clone)]
enum RandGen {
    All,
    InCheck,
    NoCheck,
}

/// Builder for randomly-generated positions, used by tests and fuzzing that
/// want a spread of realistic middlegame-ish boards rather than always the
/// starting position.
pub struct RandBoard {
    gen_type: RandGen,
    minimum_move: u16,
    prng: PRNG,
    seed: u64,
}

impl Default for RandBoard {
    fn default() -> Self {
        RandBoard {
            gen_type: RandGen::All,
            minimum_move: 2,
            prng: PRNG::init(1),
            seed: 0,
        }
    }
}

impl RandBoard {
    pub fn new() -> Self {
        RandBoard::default()
    }

    /// Generates `size` random boards.
    pub fn many(mut self, size: usize) -> Vec<Board> {
        (0..size).map(|_| self.go()).collect()
    }

    /// Generates a single random board.
    pub fn one(mut self) -> Board {
        self.go()
    }

    /// Seeds the generator so the same sequence of boards can be reproduced.
    pub fn pseudo_random(mut self, seed: u64) -> Self {
        self.seed = if seed == 0 { 1 } else { seed };
        self.prng = PRNG::init(self.seed);
        self
    }

    pub fn min_moves(mut self, moves: u16) -> Self {
        self.minimum_move = moves;
        self
    }

    pub fn in_check(mut self) -> Self {
        self.gen_type = RandGen::InCheck;
        self
    }

    pub fn no_check(mut self) -> Self {
        self.gen_type = RandGen::NoCheck;
        self
    }

    fn random(&mut self) -> usize {
        if self.seed == 0 {
            rand::random::<usize>()
        } else {
            self.prng.rand() as usize
        }
    }

    fn go(&mut self) -> Board {
        loop {
            let mut board = Board::start_pos();
            let mut iterations = 0u16;
            let mut moves = board.generate_moves();
            while iterations < 60 && !moves.is_empty() {
                if iterations >= self.minimum_move && self.to_ret(&board) && self.random() % 4 == 0 {
                    return board;
                }
                let idx = self.random() % moves.len();
                board.apply_move(moves[idx]);
                moves = board.generate_moves();
                iterations += 1;
            }
            if iterations >= self.minimum_move && self.to_ret(&board) {
                return board;
            }
        }
    }

    fn to_ret(&self, board: &Board) -> bool {
        let matches = match self.gen_type {
            RandGen::All => true,
            RandGen::InCheck => board.in_check(),
            RandGen::NoCheck => !board.in_check(),
        };
        matches && board.moves_played() >= self.minimum_move
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_pos_has_20_moves() {
        let board = Board::start_pos();
        assert_eq!(board.generate_moves().len(), 20);
        assert!(!board.in_check());
    }

    #[test]
    fn apply_and_undo_round_trips_fen() {
        let mut board = Board::start_pos();
        let fen_before = board.get_fen();
        let mov = board.generate_moves()[0];
        board.apply_move(mov);
        assert_ne!(board.get_fen(), fen_before);
        board.undo_move();
        assert_eq!(board.get_fen(), fen_before);
    }

    #[test]
    fn apply_and_undo_round_trips_zobrist() {
        let mut board = Board::start_pos();
        let zob_before = board.zobrist();
        let mov = board.generate_moves()[0];
        board.apply_move(mov);
        assert_ne!(board.zobrist(), zob_before);
        board.undo_move();
        assert_eq!(board.zobrist(), zob_before);
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let mut board = Board::start_pos();
        for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            assert!(board.apply_uci_move(uci), "move {} should apply", uci);
        }
        assert!(board.in_check());
        assert!(board.checkmate());
    }

    #[test]
    fn castling_updates_rook_and_king() {
        let mut board =
            Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let castle = board
            .generate_moves()
            .iter()
            .find(|m| m.is_king_castle())
            .copied()
            .expect("white king-side castle should be legal");
        board.apply_move(castle);
        assert_eq!(board.piece_at_sq(SQ::G1).type_of(), PieceType::K);
        assert_eq!(board.piece_at_sq(SQ::F1).type_of(), PieceType::R);
        assert!(!board.can_castle(Player::White, CastleType::KingSide));
        assert!(!board.can_castle(Player::White, CastleType::QueenSide));
        board.undo_move();
        assert_eq!(board.piece_at_sq(SQ::E1).type_of(), PieceType::K);
        assert_eq!(board.piece_at_sq(SQ::H1).type_of(), PieceType::R);
    }

    #[test]
    fn stalemate_position_has_no_moves_and_is_not_check() {
        let board = Board::from_fen("7k/5Q2/5K2/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(board.generate_moves().is_empty());
        assert!(!board.in_check());
        assert!(board.stalemate());
    }

    #[test]
    fn rand_board_generates_requested_count() {
        let boards = Board::random().pseudo_random(778_244_1).many(5);
        assert_eq!(boards.len(), 5);
        for b in &boards {
            assert!(b.is_okay().is_ok());
        }
    }

    #[test]
    fn knight_shuffle_loop_is_a_repetition() {
        let mut board = Board::start_pos();
        assert!(!board.is_repetition());
        for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            assert!(board.apply_uci_move(uci), "move {} should apply", uci);
        }
        assert!(board.is_repetition());
        assert!(board.is_draw());
    }

    #[test]
    fn capture_resets_repetition_floor() {
        let mut board = Board::from_fen("4k3/8/8/8/4r3/8/8/4K2R w K - 0 1").unwrap();
        for uci in ["h1h4", "e4h4"] {
            assert!(board.apply_uci_move(uci), "move {} should apply", uci);
        }
        assert!(!board.is_repetition());
    }

    #[test]
    fn half_move_clock_of_99_is_a_draw() {
        let mut board = Board::start_pos();
        board.state_mut().rule_50 = 99;
        assert!(board.is_draw());
    }
}
