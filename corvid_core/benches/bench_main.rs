//! Move generation and evaluation benchmarks for the board representation.

use corvid_core::board::perft::perft;
use corvid_core::Board;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_start_pos(c: &mut Criterion) {
    c.bench_function("board_start_pos", |b| b.iter(|| black_box(Board::start_pos())));
}

fn bench_generate_moves_starting(c: &mut Criterion) {
    let board = Board::start_pos();
    c.bench_function("generate_moves_starting_position", |b| {
        b.iter(|| black_box(board.generate_moves()))
    });
}

fn bench_generate_moves_midgame(c: &mut Criterion) {
    let board =
        Board::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 0 1")
            .unwrap();
    c.bench_function("generate_moves_midgame", |b| {
        b.iter(|| black_box(board.generate_moves()))
    });
}

fn bench_apply_and_undo_move(c: &mut Criterion) {
    let mut board = Board::start_pos();
    let mv = board.generate_moves().vec()[0];
    c.bench_function("apply_and_undo_move", |b| {
        b.iter(|| {
            board.apply_move(mv);
            board.undo_move();
        })
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let board = Board::start_pos();
    c.bench_function("evaluate_starting_position", |b| {
        b.iter(|| black_box(board.evaluate()))
    });
}

fn bench_perft_depth_3(c: &mut Criterion) {
    let board = Board::start_pos();
    c.bench_function("perft_depth_3", |b| b.iter(|| black_box(perft(&board, 3))));
}

criterion_group!(
    benches,
    bench_start_pos,
    bench_generate_moves_starting,
    bench_generate_moves_midgame,
    bench_apply_and_undo_move,
    bench_evaluate,
    bench_perft_depth_3,
);
criterion_main!(benches);
