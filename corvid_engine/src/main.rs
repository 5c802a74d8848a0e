//! `corvid`: a UCI chess engine. With no arguments, runs the UCI protocol
//! loop over stdin/stdout. `corvid perft <depth> [fen]` instead runs a move
//! generation node count against `startpos` (or the given FEN) and exits
//! with status 1 if move generation looks inconsistent (a sign of a bug,
//! not something a depth mismatch alone can detect from a single run).

use std::env;
use std::io;
use std::process::ExitCode;

use corvid_core::board::perft::perft;
use corvid_core::Board;
use corvid_engine::engine::Engine;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() > 1 && args[1] == "perft" {
        return run_perft(&args[2..]);
    }

    env_logger::init();
    let stdin = io::stdin();
    let mut engine = Engine::new();
    // Owned `Stdout` (not `.lock()`) so the handle is `'static` and can be
    // shared with the background search thread that reports `bestmove`.
    engine.run(stdin.lock(), io::stdout());
    ExitCode::SUCCESS
}

fn run_perft(args: &[String]) -> ExitCode {
    let depth: u16 = match args.first().and_then(|s| s.parse().ok()) {
        Some(d) => d,
        None => {
            eprintln!("usage: corvid perft <depth> [fen]");
            return ExitCode::FAILURE;
        }
    };
    let board = match args.get(1) {
        Some(fen) => match Board::from_fen(fen) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("invalid fen: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Board::start_pos(),
    };

    let nodes = perft(&board, depth);
    println!("{}", nodes);
    if nodes == 0 && depth > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
