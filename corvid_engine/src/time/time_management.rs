//! Converts a UCI `go` command's clock fields into an optimum/maximum time
//! budget for the current move.
//!
//! The formulas follow the classic `movestogo`-aware split: spend roughly
//! `1/movestogo`-th of the remaining clock as the soft ("optimum") target,
//! and allow up to a larger hard ceiling ("maximum") before the stop flag is
//! forced regardless of how the iteration is going.

use std::time::{Duration, Instant};

use corvid_core::Player;

/// The clock-related fields of a UCI `go` command, one struct per side plus
/// the shared fields.
#[derive(Clone, Copy, Debug, Default)]
pub struct GoLimits {
    pub wtime: Option<i64>,
    pub btime: Option<i64>,
    pub winc: Option<i64>,
    pub binc: Option<i64>,
    pub movestogo: Option<u32>,
    pub depth: Option<i16>,
    pub movetime: Option<i64>,
    pub nodes: Option<u64>,
    pub infinite: bool,
}

impl GoLimits {
    /// True if no clock information was supplied at all (a `depth`-only,
    /// `nodes`-only, or `infinite` search), in which case no time budget
    /// should be enforced.
    fn has_clock(&self) -> bool {
        self.wtime.is_some() || self.btime.is_some() || self.movetime.is_some()
    }
}

/// Computed optimum/maximum budgets and the node cap, plus the wall-clock
/// start used to measure elapsed time against them.
pub struct TimeManager {
    start: Instant,
    optimum: Duration,
    /// `None` means no hard deadline (infinite analysis, or depth/nodes-only
    /// search); the stop flag or node budget are the only way to end it.
    maximum: Option<Duration>,
    node_limit: Option<u64>,
}

impl TimeManager {
    /// Builds the budget for the side `us` to move, given `overhead_ms` of
    /// flat latency subtracted up front to cover UCI round-trip time.
    pub fn new(start: Instant, limits: &GoLimits, us: Player, overhead_ms: i64) -> TimeManager {
        let node_limit = limits.nodes;

        if limits.infinite || limits.depth.is_some() && !limits.has_clock() {
            return TimeManager {
                start,
                optimum: Duration::ZERO,
                maximum: None,
                node_limit,
            };
        }

        if let Some(movetime) = limits.movetime {
            let budget = (movetime - overhead_ms).max(0);
            let d = Duration::from_millis(budget as u64);
            return TimeManager {
                start,
                optimum: d,
                maximum: Some(d),
                node_limit,
            };
        }

        if !limits.has_clock() {
            return TimeManager {
                start,
                optimum: Duration::ZERO,
                maximum: None,
                node_limit,
            };
        }

        let (time, inc) = match us {
            Player::White => (limits.wtime.unwrap_or(0), limits.winc.unwrap_or(0)),
            Player::Black => (limits.btime.unwrap_or(0), limits.binc.unwrap_or(0)),
        };
        let t = (time - overhead_ms).max(0);

        let (optimum_ms, maximum_ms) = match limits.movestogo {
            None | Some(0) => (t / 25 + inc, t / 15 + 3 * inc),
            Some(m) => {
                let m = m as i64;
                (t / m + inc, 5 * t / (m + 10) + inc)
            }
        };

        let optimum_ms = optimum_ms.clamp(0, t);
        let maximum_ms = maximum_ms.clamp(0, t);

        TimeManager {
            start,
            optimum: Duration::from_millis(optimum_ms as u64),
            maximum: Some(Duration::from_millis(maximum_ms as u64)),
            node_limit,
        }
    }

    /// A manager with no deadline at all, used before the first `go` or in
    /// unit tests that don't care about timing.
    pub fn infinite(start: Instant) -> TimeManager {
        TimeManager {
            start,
            optimum: Duration::ZERO,
            maximum: None,
            node_limit: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// The soft target: iterative deepening should not start a new
    /// iteration once elapsed time has passed this.
    pub fn optimum(&self) -> Duration {
        self.optimum
    }

    /// The hard ceiling, if any.
    pub fn maximum(&self) -> Option<Duration> {
        self.maximum
    }

    /// Whether the search may continue, given the total node count searched
    /// so far across all threads. Cheap enough to be called unconditionally,
    /// but the search only calls it every 1024 nodes to amortize the
    /// `Instant::now()` syscall.
    pub fn resources_left(&self, nodes: u64) -> bool {
        if let Some(limit) = self.node_limit {
            if nodes >= limit {
                return false;
            }
        }
        match self.maximum {
            Some(max) => self.start.elapsed() < max,
            None => true,
        }
    }

    /// Whether iterative deepening should begin another, deeper iteration:
    /// the soft budget (scaled up slightly, since a started iteration that
    /// finds a new best move is worth finishing) has not yet elapsed.
    pub fn should_start_new_iteration(&self) -> bool {
        if self.optimum == Duration::ZERO {
            return true;
        }
        self.start.elapsed() < self.optimum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movetime_budget_subtracts_overhead() {
        let tm = TimeManager::new(
            Instant::now(),
            &GoLimits {
                movetime: Some(1000),
                ..Default::default()
            },
            Player::White,
            30,
        );
        assert_eq!(tm.optimum(), Duration::from_millis(970));
        assert_eq!(tm.maximum(), Some(Duration::from_millis(970)));
    }

    #[test]
    fn no_clock_info_is_infinite() {
        let tm = TimeManager::new(
            Instant::now(),
            &GoLimits {
                depth: Some(10),
                ..Default::default()
            },
            Player::White,
            30,
        );
        assert_eq!(tm.maximum(), None);
        assert!(tm.resources_left(1_000_000_000));
    }

    #[test]
    fn movestogo_zero_uses_sudden_death_divisors() {
        let tm = TimeManager::new(
            Instant::now(),
            &GoLimits {
                wtime: Some(60_000),
                winc: Some(500),
                ..Default::default()
            },
            Player::White,
            30,
        );
        let t = 60_000 - 30;
        assert_eq!(tm.optimum(), Duration::from_millis((t / 25 + 500) as u64));
        assert_eq!(
            tm.maximum(),
            Some(Duration::from_millis((t / 15 + 1500) as u64))
        );
    }

    #[test]
    fn movestogo_budget_is_clamped_to_remaining_time() {
        let tm = TimeManager::new(
            Instant::now(),
            &GoLimits {
                wtime: Some(1000),
                movestogo: Some(1),
                ..Default::default()
            },
            Player::White,
            30,
        );
        let t = 1000 - 30;
        assert_eq!(tm.optimum(), Duration::from_millis(t as u64));
        assert_eq!(tm.maximum(), Some(Duration::from_millis(t as u64)));
    }

    #[test]
    fn node_budget_cuts_off_independent_of_clock() {
        let tm = TimeManager::new(
            Instant::now(),
            &GoLimits {
                infinite: true,
                nodes: Some(1000),
                ..Default::default()
            },
            Player::White,
            30,
        );
        assert!(tm.resources_left(999));
        assert!(!tm.resources_left(1000));
    }
}
