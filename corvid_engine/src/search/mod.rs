//! Iterative-deepening alpha-beta search.
//!
//! The recursive workhorse is monomorphized over [`PVNode`] (root/pv vs.
//! non-pv pruning eligibility and PV copying) and, inside quiescence, over
//! [`CheckState`] (in-check nodes search every evasion; other nodes search
//! only captures and promotions). Neither is virtual dispatch -- both are
//! resolved at compile time per the generic parameter at each call site.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use corvid_core::core::piece_move::MoveType;
use corvid_core::core::score::Value;
use corvid_core::core::GenTypes;
use corvid_core::{BitMove, Board, PieceType, Player};

use crate::consts::*;
use crate::movepick::{mvv_lva, see, CounterMoveTable, HistoryTable, Killers, MovePicker};
use crate::root_moves::RootMoveList;
use crate::time::TimeManager;
use crate::tt::{score_from_tt, score_to_tt, Bound, TranspositionTable};

pub use crate::movepick::MAX_KILLERS_PER_PLY;

/// Everything one worker thread owns exclusively for the duration of a
/// single `go` command: its own position, move-ordering tables, and search
/// stack. Only the transposition table and the stop flag are shared.
pub struct Worker {
    pub board: Board,
    pub tt: Arc<TranspositionTable>,
    pub stop: Arc<AtomicBool>,
    pub history: HistoryTable,
    pub counter_moves: CounterMoveTable,
    killers: Vec<Killers>,
    /// `pv[ply]` is the best line found so far rooted one ply below `ply`,
    /// copied up from the child on every alpha-improving move.
    pv: Vec<Vec<BitMove>>,
    /// The move played to reach each ply, used to index the counter-move
    /// table when a child node searches its own replies.
    played: Vec<BitMove>,
    pub nodes: u64,
    pub sel_depth: i16,
    time: TimeManager,
    aborted: bool,
}

impl Worker {
    pub fn new(board: Board, tt: Arc<TranspositionTable>, stop: Arc<AtomicBool>) -> Worker {
        Worker {
            board,
            tt,
            stop,
            history: HistoryTable::new(),
            counter_moves: CounterMoveTable::new(),
            killers: vec![Killers::new(); MAX_PLY + 1],
            pv: vec![Vec::new(); MAX_PLY + 1],
            played: vec![BitMove::null(); MAX_PLY + 1],
            nodes: 0,
            sel_depth: 0,
            time: TimeManager::infinite(Instant::now()),
            aborted: false,
        }
    }

    /// Resets per-search bookkeeping (node count, abort flag, PV buffers)
    /// without touching the long-lived history/counter-move tables, which
    /// persist across a whole game.
    fn reset_for_iteration(&mut self, time: TimeManager) {
        self.time = time;
        self.nodes = 0;
        self.sel_depth = 0;
        self.aborted = false;
        for k in &mut self.killers {
            *k = Killers::new();
        }
        for line in &mut self.pv {
            line.clear();
        }
    }

    #[inline]
    fn check_time(&mut self) {
        if self.aborted {
            return;
        }
        if self.nodes % TIME_CHECK_NODES == 0
            && (self.stop.load(Ordering::Relaxed) || !self.time.resources_left(self.nodes))
        {
            self.aborted = true;
            self.stop.store(true, Ordering::Relaxed);
        }
    }

    fn killers_at(&self, ply: u16) -> [BitMove; MAX_KILLERS_PER_PLY] {
        self.killers[ply as usize].moves()
    }

    fn counter_move_for_ply(&self, ply: u16) -> BitMove {
        if ply == 0 {
            BitMove::null()
        } else {
            self.counter_moves.get(self.played[ply as usize - 1])
        }
    }

    fn update_pv(&mut self, ply: u16, m: BitMove) {
        let (head, tail) = self.pv.split_at_mut(ply as usize + 1);
        let line = &mut head[ply as usize];
        line.clear();
        line.push(m);
        if let Some(child) = tail.first() {
            line.extend_from_slice(child);
        }
    }
}

/// Whether the side to move has anything other than king and pawns --
/// null-move pruning's zugzwang guard per spec.
fn only_king_and_pawns(board: &Board, side: Player) -> bool {
    let occupied = board.get_occupied_player(side);
    let king_and_pawns = board.piece_bb(side, PieceType::K) | board.piece_bb(side, PieceType::P);
    occupied == king_and_pawns
}

/// A small, deterministic non-zero score so draws by repetition/fifty-move
/// don't all collapse to exactly zero and blind the search to a difference
/// between otherwise-equal drawing lines.
fn draw_score(nodes: u64) -> Value {
    1 - (nodes & 3) as Value
}

/// One completed iteration, handed to the UCI layer for `info depth ...`
/// reporting.
pub struct IterationInfo<'a> {
    pub depth: i16,
    pub sel_depth: i16,
    pub score: Value,
    pub nodes: u64,
    pub elapsed_ms: u64,
    pub pv: &'a [BitMove],
}

/// Runs iterative deepening from depth 1 to `max_depth` (or until the time
/// manager or stop flag cuts it off), calling `report` after every
/// completed depth. A depth aborted partway through never updates the root
/// move list's scores and is discarded, per the cancellation contract: the
/// last fully completed depth's best move remains in `root_moves`.
pub fn iterative_deepening(
    worker: &mut Worker,
    root_moves: &mut RootMoveList,
    max_depth: i16,
    time: TimeManager,
    mut report: impl FnMut(&IterationInfo),
) {
    worker.reset_for_iteration(time);
    if root_moves.is_empty() {
        return;
    }

    let start = Instant::now();
    let mut depth: i16 = 1;
    loop {
        root_moves.prepare_for_new_iteration();

        let mut alpha = -INF_SCORE;
        let mut beta = INF_SCORE;
        let mut delta = ASPIRATION_DELTA;
        if depth >= ASPIRATION_DEPTH {
            let prev = root_moves.best().prev_score;
            if prev != UNKNOWN_SCORE {
                alpha = (prev - delta).max(-INF_SCORE);
                beta = (prev + delta).min(INF_SCORE);
            }
        }

        loop {
            let score = search_root(worker, root_moves, depth, alpha, beta);
            if worker.aborted {
                break;
            }
            root_moves.sort();
            if score <= alpha {
                beta = (alpha + beta) / 2;
                alpha = (score - delta).max(-INF_SCORE);
                delta += delta / 2;
            } else if score >= beta {
                beta = (score + delta).min(INF_SCORE);
                delta += delta / 2;
            } else {
                break;
            }
        }

        if worker.aborted {
            break;
        }

        root_moves.sort();
        let best = root_moves.best();
        report(&IterationInfo {
            depth,
            sel_depth: worker.sel_depth,
            score: best.score,
            nodes: worker.nodes,
            elapsed_ms: start.elapsed().as_millis() as u64,
            pv: &best.pv,
        });

        if depth >= max_depth || depth as usize + 1 >= MAX_PLY {
            break;
        }
        if !worker.time.should_start_new_iteration() {
            break;
        }
        depth += 1;
    }
}

/// The root node: iterates the (possibly `searchmoves`-restricted) root
/// move list instead of a freshly generated one, since root moves carry
/// their own running PV and score across iterations.
fn search_root(
    worker: &mut Worker,
    root_moves: &mut RootMoveList,
    depth: i16,
    alpha: Value,
    beta: Value,
) -> Value {
    let mut alpha = alpha;
    let mut best_score = -INF_SCORE;
    let mut first = true;

    let moves: Vec<BitMove> = root_moves.iter().map(|rm| rm.first_move()).collect();
    for m in moves {
        worker.check_time();
        if worker.aborted {
            return UNKNOWN_SCORE;
        }

        worker.nodes += 1;
        worker.played[0] = m;
        worker.board.apply_move(m);

        let score = if first {
            -search::<PV>(worker, -beta, -alpha, depth - 1, 1)
        } else {
            let reduced = -search::<NonPV>(worker, -alpha - 1, -alpha, depth - 1, 1);
            if !worker.aborted && reduced > alpha && reduced < beta {
                -search::<PV>(worker, -beta, -alpha, depth - 1, 1)
            } else {
                reduced
            }
        };

        worker.board.undo_move();

        if worker.aborted {
            return UNKNOWN_SCORE;
        }

        if let Some(rm) = root_moves.find_mut(m) {
            rm.score = score;
            if score > alpha || first {
                rm.set_pv(&worker.pv[1]);
            }
        }

        if score > best_score {
            best_score = score;
        }
        if score > alpha {
            alpha = score;
        }
        first = false;
    }

    best_score
}

/// The recursive negamax/PVS workhorse for every node below the root.
fn search<N: PVNode>(worker: &mut Worker, mut alpha: Value, beta: Value, depth: i16, ply: u16) -> Value {
    if depth <= 0 {
        return quiescence::<N>(worker, alpha, beta, ply);
    }

    worker.nodes += 1;
    worker.check_time();
    if worker.aborted {
        return UNKNOWN_SCORE;
    }
    if ply as i16 > worker.sel_depth {
        worker.sel_depth = ply as i16;
    }

    worker.pv[ply as usize].clear();

    if ply as usize >= MAX_PLY {
        return worker.board.evaluate();
    }

    if worker.board.is_draw() {
        return draw_score(worker.nodes);
    }

    let in_check = worker.board.in_check();
    let zobrist = worker.board.zobrist();
    let tt_entry = worker.tt.probe(zobrist);

    if let Some(entry) = tt_entry {
        if !N::is_pv() && entry.depth >= depth {
            let tt_score = score_from_tt(entry.score, ply);
            let cuts = match entry.bound {
                Bound::Exact => true,
                Bound::Lower => tt_score >= beta,
                Bound::Upper => tt_score <= alpha,
                Bound::None => false,
            };
            if cuts {
                return tt_score;
            }
        }
    }

    let tt_move = tt_entry.map(|e| e.best_move).unwrap_or_else(BitMove::null);
    let static_eval = worker.board.evaluate();

    // Reverse futility pruning.
    if !N::is_pv()
        && !in_check
        && depth <= RFP_DEPTH
        && beta.abs() < TB_WORST_WIN
        && static_eval - RFP_MULTI * depth as Value >= beta
    {
        return beta;
    }

    // Null-move pruning, guarded against zugzwang-prone king+pawn endgames.
    if !N::is_pv()
        && !in_check
        && depth >= NMP_DEPTH
        && static_eval >= beta
        && !only_king_and_pawns(&worker.board, worker.board.turn())
    {
        let reduction = NMP_BASE + depth / NMP_DEPTH_MULTI;
        worker.board.apply_null_move();
        worker.played[ply as usize] = BitMove::null();
        let null_score =
            -search::<NonPV>(worker, -beta, -beta + 1, depth - 1 - reduction, ply + 1);
        worker.board.undo_null_move();
        if worker.aborted {
            return UNKNOWN_SCORE;
        }
        if null_score >= beta {
            return if null_score.abs() >= TB_WORST_WIN {
                beta
            } else {
                null_score
            };
        }
    }

    let killers = worker.killers_at(ply);
    let counter_move = worker.counter_move_for_ply(ply);
    let mut picker = MovePicker::new(tt_move, killers, counter_move);

    let turn = worker.board.turn();
    let mut best_score = -INF_SCORE;
    let mut best_move = BitMove::null();
    let mut move_count = 0usize;
    let mut quiets_tried: Vec<BitMove> = Vec::new();

    while let Some(m) = picker.next(&worker.board, &worker.history) {
        move_count += 1;
        let is_quiet = !m.is_capture() && !m.is_promo();

        worker.played[ply as usize] = m;
        worker.board.apply_move(m);

        let score = if move_count == 1 {
            -search::<N>(worker, -beta, -alpha, depth - 1, ply + 1)
        } else {
            let reduced = -search::<NonPV>(worker, -alpha - 1, -alpha, depth - 1, ply + 1);
            if !worker.aborted && reduced > alpha && N::is_pv() {
                -search::<N>(worker, -beta, -alpha, depth - 1, ply + 1)
            } else {
                reduced
            }
        };

        worker.board.undo_move();

        if worker.aborted {
            return UNKNOWN_SCORE;
        }

        if is_quiet {
            quiets_tried.push(m);
        }

        if score > best_score {
            best_score = score;
            best_move = m;
        }

        if score > alpha {
            alpha = score;
            worker.update_pv(ply, m);
            if score >= beta {
                if is_quiet {
                    worker.killers[ply as usize].update(m);
                    let prev = if ply == 0 {
                        BitMove::null()
                    } else {
                        worker.played[ply as usize - 1]
                    };
                    worker.counter_moves.update(prev, m);
                    worker.history.update(turn, m, &quiets_tried, depth);
                }
                worker
                    .tt
                    .store(zobrist, m, score_to_tt(score, ply), depth, Bound::Lower);
                return beta;
            }
        }
    }

    if move_count == 0 {
        return if in_check {
            -(MATE_VALUE - ply as Value)
        } else {
            DRAW
        };
    }

    let bound = if best_move.is_null() {
        Bound::Upper
    } else {
        Bound::Exact
    };
    worker
        .tt
        .store(zobrist, best_move, score_to_tt(best_score, ply), depth, bound);

    best_score
}

fn quiescence<N: PVNode>(worker: &mut Worker, alpha: Value, beta: Value, ply: u16) -> Value {
    if worker.board.in_check() {
        quiescence_impl::<N, InCheck>(worker, alpha, beta, ply)
    } else {
        quiescence_impl::<N, NoCheck>(worker, alpha, beta, ply)
    }
}

fn quiescence_impl<N: PVNode, C: CheckState>(
    worker: &mut Worker,
    mut alpha: Value,
    beta: Value,
    ply: u16,
) -> Value {
    worker.nodes += 1;
    worker.check_time();
    if worker.aborted {
        return UNKNOWN_SCORE;
    }
    if ply as i16 > worker.sel_depth {
        worker.sel_depth = ply as i16;
    }
    worker.pv[ply as usize].clear();

    if ply as usize >= MAX_PLY {
        return worker.board.evaluate();
    }
    if worker.board.is_draw() {
        return draw_score(worker.nodes);
    }

    let mut best_score;
    if C::in_check() {
        best_score = -INF_SCORE;
    } else {
        let stand_pat = worker.board.evaluate();
        if stand_pat >= beta {
            return stand_pat;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }
        best_score = stand_pat;
    }

    let moves = if C::in_check() {
        worker.board.generate_moves_of_type(GenTypes::Evasions)
    } else {
        worker.board.generate_moves_of_type(GenTypes::Captures)
    };

    let mut ordered: Vec<BitMove> = moves.iter().copied().collect();
    ordered.sort_by_key(|&m| std::cmp::Reverse(mvv_lva(&worker.board, m)));

    let mut move_count = 0usize;
    for m in ordered {
        if !C::in_check() && m.move_type() != MoveType::Promotion && see(&worker.board, m) < 0 {
            continue;
        }
        move_count += 1;

        worker.board.apply_move(m);
        let score = -quiescence::<N>(worker, -beta, -alpha, ply + 1);
        worker.board.undo_move();

        if worker.aborted {
            return UNKNOWN_SCORE;
        }

        if score > best_score {
            best_score = score;
            if score > alpha {
                alpha = score;
                worker.update_pv(ply, m);
                if score >= beta {
                    return beta;
                }
            }
        }
    }

    if C::in_check() && move_count == 0 {
        return -(MATE_VALUE - ply as Value);
    }

    best_score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::root_moves::RootMoveList;
    use crate::time::GoLimits;
    use crate::tt::TranspositionTable;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn searcher(board: Board) -> Worker {
        Worker::new(
            board,
            Arc::new(TranspositionTable::new(1)),
            Arc::new(AtomicBool::new(false)),
        )
    }

    #[test]
    fn finds_mate_in_one_back_rank() {
        let board = Board::from_fen("6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1").unwrap();
        let mut worker = searcher(board.shallow_clone());
        let mut root_moves = RootMoveList::new(&board.generate_moves().vec());
        let time = TimeManager::infinite(Instant::now());
        iterative_deepening(&mut worker, &mut root_moves, 8, time, |_| {});
        root_moves.sort();
        let best = root_moves.best();
        assert_eq!(best.first_move().stringify(), "d1d8");
        assert!(best.score >= MATE_VALUE - 2);
    }

    #[test]
    fn recognizes_fools_mate_as_already_checkmated() {
        let mut board = Board::start_pos();
        for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            assert!(board.apply_uci_move(mv));
        }
        assert!(board.checkmate());
    }

    #[test]
    fn avoids_stalemate_when_a_winning_move_exists() {
        let board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 w - - 0 1").unwrap();
        let mut worker = searcher(board.shallow_clone());
        let mut root_moves = RootMoveList::new(&board.generate_moves().vec());
        let time = TimeManager::infinite(Instant::now());
        iterative_deepening(&mut worker, &mut root_moves, 4, time, |_| {});
        root_moves.sort();
        assert_ne!(root_moves.best().first_move().stringify(), "f7g7");
    }

    #[test]
    fn finds_winning_pawn_promotion() {
        let board = Board::from_fen("8/P7/8/8/8/8/8/k6K w - - 0 1").unwrap();
        let mut worker = searcher(board.shallow_clone());
        let mut root_moves = RootMoveList::new(&board.generate_moves().vec());
        let time = TimeManager::infinite(Instant::now());
        iterative_deepening(&mut worker, &mut root_moves, 5, time, |_| {});
        root_moves.sort();
        let best = root_moves.best();
        assert_eq!(best.first_move().stringify(), "a7a8q");
        assert!(best.score > 300);
    }

    #[test]
    fn node_budget_stops_the_search() {
        let board = Board::start_pos();
        let mut worker = searcher(board.shallow_clone());
        let mut root_moves = RootMoveList::new(&board.generate_moves().vec());
        let time = TimeManager::new(
            Instant::now(),
            &GoLimits {
                nodes: Some(500),
                infinite: true,
                ..Default::default()
            },
            Player::White,
            0,
        );
        iterative_deepening(&mut worker, &mut root_moves, 40, time, |_| {});
        assert!(worker.nodes < 50_000);
    }
}
