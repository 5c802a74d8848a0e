//! Boundary trait for endgame-tablebase probing.
//!
//! Wiring an actual Syzygy probing library is out of scope (an external
//! collaborator); this only defines the seam `setoption name SyzygyPath`
//! wires a path into, plus the always-unavailable default implementation.

use corvid_core::core::score::Value;
use corvid_core::{BitMove, Board};

/// Result of probing a tablebase for the win/draw/loss value of a position.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Wdl {
    Win,
    Loss,
    Draw,
}

/// A source of tablebase information, probed at the root and (optionally)
/// inside the search tree once the piece count drops low enough.
pub trait Tablebase: Send + Sync {
    /// Probes the win/draw/loss value of `board`, if tablebase data covers
    /// its piece count.
    fn probe_wdl(&self, board: &Board) -> Option<Wdl>;

    /// Probes for the best root move and its WDL, used to play a
    /// tablebase-perfect move directly rather than trusting the search.
    fn probe_root_move(&self, board: &Board) -> Option<(BitMove, Wdl)>;
}

/// The default tablebase: always reports "unavailable", so callers fall
/// through to ordinary search. Used until a real probing library is wired
/// in via `SyzygyPath`.
pub struct NoTablebase;

impl Tablebase for NoTablebase {
    fn probe_wdl(&self, _board: &Board) -> Option<Wdl> {
        None
    }

    fn probe_root_move(&self, _board: &Board) -> Option<(BitMove, Wdl)> {
        None
    }
}

/// Maps a tablebase WDL result to the internal score convention (spec §6):
/// win/loss saturate to the TB sentinel scores, draws (including cursed or
/// blessed results, which this boundary does not distinguish) score zero.
pub fn wdl_to_score(wdl: Wdl) -> Value {
    match wdl {
        Wdl::Win => crate::consts::TB_WIN_SCORE,
        Wdl::Loss => -crate::consts::TB_WIN_SCORE,
        Wdl::Draw => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_tablebase_is_always_unavailable() {
        let board = Board::start_pos();
        let tb = NoTablebase;
        assert_eq!(tb.probe_wdl(&board), None);
        assert_eq!(tb.probe_root_move(&board), None);
    }
}
