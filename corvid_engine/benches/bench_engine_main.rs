//! Search benchmarks: transposition table throughput and fixed-depth search.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use corvid_core::Board;
use corvid_engine::root_moves::RootMoveList;
use corvid_engine::search::{iterative_deepening, Worker};
use corvid_engine::time::TimeManager;
use corvid_engine::tt::{Bound, TranspositionTable};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_tt_store_probe(c: &mut Criterion) {
    let tt = TranspositionTable::new(16);
    c.bench_function("tt_store_then_probe", |b| {
        b.iter(|| {
            tt.store(black_box(12345), corvid_core::BitMove::null(), 10, 4, Bound::Exact);
            black_box(tt.probe(12345))
        })
    });
}

fn bench_search_depth_4(c: &mut Criterion) {
    c.bench_function("search_startpos_depth_4", |b| {
        b.iter(|| {
            let board = Board::start_pos();
            let tt = Arc::new(TranspositionTable::new(16));
            let stop = Arc::new(AtomicBool::new(false));
            let mut worker = Worker::new(board.shallow_clone(), tt, stop);
            let moves = board.generate_moves().vec();
            let mut root_moves = RootMoveList::new(&moves);
            iterative_deepening(
                &mut worker,
                &mut root_moves,
                4,
                TimeManager::infinite(std::time::Instant::now()),
                |_| {},
            );
            black_box(root_moves.best().score)
        })
    });
}

criterion_group!(benches, bench_tt_store_probe, bench_search_depth_4);
criterion_main!(benches);
