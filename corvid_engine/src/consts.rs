//! Tunable search constants and the zero-sized marker types used to
//! monomorphize the search function over PV-ness and check state, the way
//! `corvid_core`'s move generator monomorphizes over player and move kind.

pub use corvid_core::core::score::{
    DRAW, INF_SCORE, KING_VALUE, MATE_VALUE, TB_BEST_LOSS, TB_LOSS_SCORE, TB_WIN_SCORE,
    TB_WORST_WIN, UNKNOWN_SCORE, ZERO,
};

/// Maximum search depth in plies. Stacks (killers, history, PV arrays) are
/// sized off this.
pub const MAX_PLY: usize = 100;

pub const MAX_THREADS: usize = 256;

/// Default transposition table size, in megabytes.
pub const DEFAULT_TT_SIZE: usize = 256;

/// Iterative-deepening depth at which aspiration windows kick in; below this
/// every iteration searches a full `[-INF, INF]` window.
pub const ASPIRATION_DEPTH: i16 = 9;
/// Half-width of the initial aspiration window around the previous score.
pub const ASPIRATION_DELTA: i32 = 30;

/// Reverse futility pruning applies only at or below this depth.
pub const RFP_DEPTH: i16 = 8;
/// Centipawns of margin removed from the static eval per remaining ply when
/// reverse-futility-pruning a non-PV node.
pub const RFP_MULTI: i32 = 75;

/// Null-move pruning requires at least this much depth to try the null move.
pub const NMP_DEPTH: i16 = 3;
/// Base ply reduction applied to a null-move search.
pub const NMP_BASE: i16 = 3;
/// Additional depth-dependent reduction divisor for null-move pruning.
pub const NMP_DEPTH_MULTI: i16 = 4;

/// How many nodes pass between checks of the clock/stop flag.
pub const TIME_CHECK_NODES: u64 = 1024;

/// Flat per-move overhead subtracted from the time budget, covering UCI
/// round-trip and engine startup latency.
pub const MOVE_OVERHEAD_MSEC: i64 = 30;

/// Marker trait distinguishing PV from non-PV search nodes at compile time.
pub trait PVNode {
    fn is_pv() -> bool;
}

pub struct PV;
pub struct NonPV;

impl PVNode for PV {
    #[inline(always)]
    fn is_pv() -> bool {
        true
    }
}

impl PVNode for NonPV {
    #[inline(always)]
    fn is_pv() -> bool {
        false
    }
}

/// Marker trait distinguishing whether the side to move is in check at a
/// node, used to skip a runtime branch in quiescence search.
pub trait CheckState {
    fn in_check() -> bool;
}

pub struct InCheck;
pub struct NoCheck;

impl CheckState for InCheck {
    #[inline(always)]
    fn in_check() -> bool {
        true
    }
}

impl CheckState for NoCheck {
    #[inline(always)]
    fn in_check() -> bool {
        false
    }
}
