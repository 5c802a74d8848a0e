//! Primitives for describing the value of a position or a piece.
//!
//! Positional evaluation in `corvid` comes entirely from the NNUE accumulator
//! (see [`crate::nnue`]); this module only keeps the sentinel values and the
//! static piece values used for move ordering (SEE, MVV-LVA) and search
//! bookkeeping, the way the rest of the corpus keeps a small `Value` type
//! alongside its search code.

/// Type used to represent the centipawn value of an evaluation or a score.
pub type Value = i32;

pub const ZERO: Value = 0;
pub const DRAW: Value = 0;

/// Sentinel returned by a search call that could not complete (stopped or
/// time-limited) before producing a real score.
pub const UNKNOWN_SCORE: Value = 100_002;
/// Upper bound used to initialize alpha-beta windows.
pub const INF_SCORE: Value = 100_001;
/// Score assigned to an immediate checkmate; reduced by ply to favor shorter
/// mates, per the usual "mate in N" convention.
pub const MATE_VALUE: Value = 100_000;
pub const TB_WIN_SCORE: Value = 50_000;
pub const TB_WORST_WIN: Value = 49_000;
pub const TB_BEST_LOSS: Value = -49_000;
pub const TB_LOSS_SCORE: Value = -50_000;

/// Static material values, used for SEE and MVV-LVA ordering rather than
/// positional evaluation.
pub const PAWN_VALUE: Value = 100;
pub const KNIGHT_VALUE: Value = 320;
pub const BISHOP_VALUE: Value = 330;
pub const ROOK_VALUE: Value = 500;
pub const QUEEN_VALUE: Value = 900;
pub const KING_VALUE: Value = 20_000;

use super::PieceType;

/// Returns the static material value used for SEE/MVV-LVA ordering. Not used
/// for positional evaluation, which is the NNUE accumulator's job.
#[inline]
pub fn piece_type_value(pt: PieceType) -> Value {
    match pt {
        PieceType::P => PAWN_VALUE,
        PieceType::N => KNIGHT_VALUE,
        PieceType::B => BISHOP_VALUE,
        PieceType::R => ROOK_VALUE,
        PieceType::Q => QUEEN_VALUE,
        PieceType::K => KING_VALUE,
        PieceType::None | PieceType::All => ZERO,
    }
}
