//! [`BoardState`]: the per-ply information [`Board`] cannot cheaply
//! recompute on undo, so it is saved on a stack instead.
//!
//! Earlier revisions of this structure formed a persistent tree via
//! `Option<Arc<BoardState>>` parent pointers, so that cloned boards could
//! share history. This one instead lives in a flat `Vec<BoardState>` owned
//! by [`Board`]; undoing a move just pops the stack. Repetition and the
//! fifty-move rule need to look back only as far as the last irreversible
//! move, so rather than a pointer to that ancestor we store its index in the
//! stack -- cheap to copy, and with no risk of a reference cycle.
//!
//! [`Board`]: super::Board

use super::castle_rights::Castling;

use crate::core::bitboard::BitBoard;
use crate::core::masks::*;
use crate::core::piece_move::BitMove;
use crate::core::sq::{NO_SQ, SQ};
use crate::core::PieceType;
use crate::nnue::Accumulator;

/// Information about the position produced by making a move, expensive
/// enough (checkers, pins, the Zobrist key, the NNUE accumulator) that it is
/// computed once on `make_move` and kept around for `undo_move` rather than
/// recomputed.
#[derive(Clone)]
pub struct BoardState {
    /// Castling rights remaining for both players.
    pub castling: Castling,
    /// Plies since the last capture or pawn push; 100 or more is a draw.
    pub rule_50: i16,
    /// Plies since the `Board` was created.
    pub ply: u16,
    /// Square behind a double pawn push just played, or `NO_SQ`.
    pub ep_square: SQ,

    /// The Zobrist key of the position after this move.
    pub zobrist: u64,
    /// Index into the board's state stack of the most recent irreversible
    /// move (capture, pawn push, castle, or loss of a castling right).
    /// Repetition detection never needs to look further back than this.
    pub last_irreversible: u16,
    /// The piece captured to reach this state, if any.
    pub captured_piece: Option<PieceType>,
    /// Pieces currently giving check to the side to move.
    pub checkers_bb: BitBoard,
    /// Per player, pieces (of either color) blocking a check on that
    /// player's own king.
    pub blockers_king: [BitBoard; PLAYER_CNT],
    /// Per player, the opponent's pieces pinning `blockers_king` to that
    /// player's king.
    pub pinners_king: [BitBoard; PLAYER_CNT],
    /// Per piece type, squares from which that piece type would check the
    /// side to move's king.
    pub check_sqs: [BitBoard; PIECE_TYPE_CNT],
    /// The move played to reach this state, or `BitMove::null()`.
    pub prev_move: BitMove,
    /// Snapshot of both perspectives' NNUE hidden-layer sums after this move.
    pub accumulator: Accumulator,
}

impl BoardState {
    /// The state of a freshly-created starting position, before any
    /// checkers/pins/accumulator fields have been filled in by the `Board`
    /// that owns it.
    pub fn blank() -> BoardState {
        BoardState {
            castling: Castling::all_castling(),
            rule_50: 0,
            ply: 0,
            ep_square: NO_SQ,
            zobrist: 0,
            last_irreversible: 0,
            captured_piece: None,
            checkers_bb: BitBoard(0),
            blockers_king: [BitBoard(0); PLAYER_CNT],
            pinners_king: [BitBoard(0); PLAYER_CNT],
            check_sqs: [BitBoard(0); PIECE_TYPE_CNT],
            prev_move: BitMove::null(),
            accumulator: Accumulator::blank(),
        }
    }

    /// Copies the fields that survive a move unconditionally (castling,
    /// rule_50, ply, ep_square are overwritten separately by the caller as
    /// appropriate); the rest are placeholders the `Board` fills in as part
    /// of `make_move`.
    pub fn partial_clone(&self) -> BoardState {
        BoardState {
            castling: self.castling,
            rule_50: self.rule_50,
            ply: self.ply,
            ep_square: self.ep_square,
            zobrist: self.zobrist,
            last_irreversible: self.last_irreversible,
            captured_piece: None,
            checkers_bb: BitBoard(0),
            blockers_king: [BitBoard(0); PLAYER_CNT],
            pinners_king: [BitBoard(0); PLAYER_CNT],
            check_sqs: [BitBoard(0); PIECE_TYPE_CNT],
            prev_move: BitMove::null(),
            accumulator: self.accumulator,
        }
    }

    /// Prints a one-line summary, for debugging.
    pub fn print_info(&self) {
        print!("ply: {}, move played: {} ", self.ply, self.prev_move);
        if let Some(piece) = self.captured_piece {
            print!("cap {} ", piece);
        }
        if !self.checkers_bb.is_empty() {
            print!("in check {}", self.checkers_bb.to_sq());
        }
        println!();
    }
}

impl PartialEq for BoardState {
    fn eq(&self, other: &BoardState) -> bool {
        self.castling == other.castling
            && self.rule_50 == other.rule_50
            && self.ep_square == other.ep_square
            && self.zobrist == other.zobrist
            && self.captured_piece == other.captured_piece
            && self.checkers_bb == other.checkers_bb
            && self.blockers_king == other.blockers_king
            && self.pinners_king == other.pinners_king
            && self.check_sqs == other.check_sqs
    }
}
