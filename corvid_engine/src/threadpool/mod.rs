//! The search thread pool: spawns a `go` command onto a background thread so
//! the UCI loop keeps reading stdin (and can see a `stop`), and fans that
//! thread's work out across `Threads` lazy-SMP helpers that share the
//! transposition table and stop flag with the reporting thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use corvid_core::{BitMove, Board};

use crate::consts::MAX_PLY;
use crate::root_moves::RootMoveList;
use crate::search::{self, IterationInfo, Worker};
use crate::time::{GoLimits, TimeManager};
use crate::tt::TranspositionTable;

/// The outcome of one `go` command: the move to play, and (if the PV ran at
/// least two moves deep) the move to ponder on.
#[derive(Copy, Clone)]
pub struct SearchResult {
    pub best_move: BitMove,
    pub ponder_move: BitMove,
}

/// Owns the shared transposition table and stop flag, and dispatches `go`
/// commands onto a background thread.
pub struct ThreadPool {
    tt: Arc<TranspositionTable>,
    stop: Arc<AtomicBool>,
    num_threads: usize,
    overhead_ms: i64,
    handle: Option<JoinHandle<SearchResult>>,
}

impl ThreadPool {
    pub fn new(tt_mb: usize, num_threads: usize) -> ThreadPool {
        ThreadPool {
            tt: Arc::new(TranspositionTable::new(tt_mb)),
            stop: Arc::new(AtomicBool::new(false)),
            num_threads: num_threads.max(1),
            overhead_ms: crate::consts::MOVE_OVERHEAD_MSEC,
            handle: None,
        }
    }

    pub fn set_num_threads(&mut self, n: usize) {
        self.num_threads = n.max(1);
    }

    pub fn set_move_overhead(&mut self, ms: i64) {
        self.overhead_ms = ms;
    }

    pub fn resize_tt(&mut self, mb: usize) {
        self.tt = Arc::new(TranspositionTable::new(mb));
    }

    pub fn clear_tt(&self) {
        self.tt.clear();
    }

    pub fn hashfull_permille(&self) -> u32 {
        self.tt.hashfull_permille()
    }

    pub fn is_searching(&self) -> bool {
        self.handle.is_some()
    }

    /// Trips the stop flag; the running search (if any) will unwind and
    /// report its last completed depth's move on the next `wait_for_finish`.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Starts a search in the background. `on_iteration` is called from the
    /// search thread after every completed depth and must itself print the
    /// `info ...` line -- UCI output is a wire protocol, not something to
    /// buffer and hand back. `on_complete` is called exactly once, from the
    /// same background thread, the moment the search concludes for *any*
    /// reason (depth limit, time/node budget, or an explicit `stop`) -- a
    /// `go depth N`/`go movetime N` search must report `bestmove` on its
    /// own without waiting for a `stop` that a real GUI may never send.
    pub fn go(
        &mut self,
        board: &Board,
        limits: GoLimits,
        search_moves: Vec<BitMove>,
        mut on_iteration: impl FnMut(&IterationInfo) + Send + 'static,
        on_complete: impl FnOnce(SearchResult) + Send + 'static,
    ) {
        if self.is_searching() {
            self.stop();
            self.wait_for_finish();
        }
        self.stop.store(false, Ordering::Relaxed);

        let tt = Arc::clone(&self.tt);
        let stop = Arc::clone(&self.stop);
        let fallback_board = board.parallel_clone();
        let board = board.parallel_clone();
        let num_threads = self.num_threads;
        let overhead_ms = self.overhead_ms;

        self.handle = Some(thread::spawn(move || {
            let mut result = run_search(
                board,
                tt,
                stop,
                num_threads,
                overhead_ms,
                limits,
                search_moves,
                &mut on_iteration,
            );
            if result.best_move.is_null() {
                result.best_move = fallback_board
                    .generate_moves()
                    .iter()
                    .next()
                    .copied()
                    .unwrap_or_else(BitMove::null);
            }
            on_complete(result.clone());
            result
        }));
    }

    /// Blocks until the in-flight search (if any) finishes, returning its
    /// result. A `stop` command should call [`ThreadPool::stop`] first so
    /// this returns promptly. The `go`-time `on_complete` callback has
    /// already reported `bestmove` by the time this returns; callers only
    /// need this to know the search thread has actually exited.
    pub fn wait_for_finish(&mut self) -> SearchResult {
        match self.handle.take() {
            Some(h) => h.join().unwrap_or(SearchResult {
                best_move: BitMove::null(),
                ponder_move: BitMove::null(),
            }),
            None => SearchResult {
                best_move: BitMove::null(),
                ponder_move: BitMove::null(),
            },
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_search(
    board: Board,
    tt: Arc<TranspositionTable>,
    stop: Arc<AtomicBool>,
    num_threads: usize,
    overhead_ms: i64,
    limits: GoLimits,
    search_moves: Vec<BitMove>,
    on_iteration: &mut (dyn FnMut(&IterationInfo) + Send),
) -> SearchResult {
    let start = Instant::now();
    let us = board.turn();
    let max_depth = limits.depth.unwrap_or((MAX_PLY - 1) as i16);

    let root_moves_vec = board.generate_moves().vec();
    let mut result = SearchResult {
        best_move: BitMove::null(),
        ponder_move: BitMove::null(),
    };

    crossbeam_utils::thread::scope(|scope| {
        for _ in 1..num_threads {
            let helper_board = board.parallel_clone();
            let helper_tt = Arc::clone(&tt);
            let helper_stop = Arc::clone(&stop);
            let helper_time = TimeManager::new(start, &limits, us, overhead_ms);
            let helper_moves = root_moves_vec.clone();
            let helper_search_moves = search_moves.clone();
            scope.spawn(move |_| {
                let mut worker = Worker::new(helper_board, helper_tt, helper_stop);
                let mut root_moves = RootMoveList::new(&helper_moves);
                root_moves.restrict_to(&helper_search_moves);
                search::iterative_deepening(&mut worker, &mut root_moves, max_depth, helper_time, |_| {});
            });
        }

        let mut main_worker = Worker::new(board.parallel_clone(), Arc::clone(&tt), Arc::clone(&stop));
        let mut root_moves = RootMoveList::new(&root_moves_vec);
        root_moves.restrict_to(&search_moves);
        let main_time = TimeManager::new(start, &limits, us, overhead_ms);

        search::iterative_deepening(&mut main_worker, &mut root_moves, max_depth, main_time, |info| {
            if let Some(&best) = info.pv.first() {
                result.best_move = best;
            }
            result.ponder_move = info.pv.get(1).copied().unwrap_or_else(BitMove::null);
            on_iteration(info);
        });

        stop.store(true, Ordering::Relaxed);
    })
    .expect("search thread panicked");

    result
}
