//! The top-level engine: owns the board, the thread pool, and the options
//! table, and drives the UCI command loop.

use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};

use corvid_core::{BitMove, Board};
use log::warn;

use crate::consts::{DEFAULT_TT_SIZE, MATE_VALUE};
use crate::tablebase::{NoTablebase, Tablebase};
use crate::threadpool::ThreadPool;
use crate::uci::options::{OptionWork, OptionsMap};
use crate::uci::parse;

pub static ID_NAME: &str = "Corvid";
pub static ID_AUTHORS: &str = "the corvid authors";
pub static VERSION: &str = env!("CARGO_PKG_VERSION");

/// The shared UCI output sink: one writer, handed to the background search
/// thread as well as the command loop, so `bestmove` can be printed the
/// moment a search concludes on its own instead of only when `stop` arrives.
type Sink = Arc<Mutex<dyn Write + Send>>;

/// Ties the transposition table, thread pool, time manager and options
/// table together and runs the UCI read-eval-print loop over stdin/stdout.
pub struct Engine {
    options: OptionsMap,
    pool: ThreadPool,
    board: Board,
    tablebase: Box<dyn Tablebase>,
}

impl Engine {
    pub fn new() -> Engine {
        Engine {
            options: OptionsMap::new(),
            pool: ThreadPool::new(DEFAULT_TT_SIZE, num_cpus::get()),
            board: Board::start_pos(),
            tablebase: Box::new(NoTablebase),
        }
    }

    /// Runs the UCI loop until `quit`, reading commands from `input` and
    /// writing protocol output to `output`. `output` is shared with the
    /// background search thread so a `go depth N`/`go movetime N` search can
    /// report `bestmove` the instant it concludes, independent of whether a
    /// `stop` command ever arrives.
    pub fn run(&mut self, input: impl BufRead, output: impl Write + Send + 'static) {
        let output: Sink = Arc::new(Mutex::new(output));
        self.uci_startup(&output);
        for line in input.lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => break,
            };
            let args: Vec<&str> = line.split_whitespace().collect();
            let command = *args.first().unwrap_or(&"");
            match command {
                "" => continue,
                "uci" => self.uci_startup(&output),
                "setoption" => self.apply_option(&line, &output),
                "ucinewgame" => self.new_game(),
                "isready" => {
                    let _ = writeln!(output.lock().unwrap(), "readyok");
                }
                "position" => match parse::position_parse_board(&args[1..]) {
                    Ok(b) => self.board = b,
                    Err(e) => {
                        let _ = writeln!(output.lock().unwrap(), "info string {}", e);
                    }
                },
                "go" => self.go(&args[1..], &output),
                "stop" => self.stop(),
                "quit" => {
                    self.stop();
                    break;
                }
                _ => {
                    let _ = writeln!(output.lock().unwrap(), "info string unknown command: {}", line);
                }
            }
        }
    }

    fn new_game(&mut self) {
        self.pool.clear_tt();
        self.board = Board::start_pos();
    }

    fn go(&mut self, args: &[&str], output: &Sink) {
        let (limits, uci_search_moves) = parse::parse_go(args);

        if let Some((mv, _wdl)) = self.tablebase.probe_root_move(&self.board) {
            let _ = writeln!(output.lock().unwrap(), "bestmove {}", mv.stringify());
            return;
        }

        let search_moves = parse::resolve_search_moves(&self.board, &uci_search_moves);
        let fallback_board = self.board.parallel_clone();
        let info_sink = Arc::clone(output);
        let complete_sink = Arc::clone(output);
        self.pool.go(
            &self.board,
            limits,
            search_moves,
            move |info| {
                let pv: Vec<String> = info.pv.iter().map(|m| m.stringify()).collect();
                let score_str = if info.score.abs() >= MATE_VALUE - 1000 {
                    let mate_in = (MATE_VALUE - info.score.abs() + 1) / 2;
                    let signed = if info.score > 0 { mate_in } else { -mate_in };
                    format!("mate {}", signed)
                } else {
                    format!("cp {}", info.score)
                };
                let _ = writeln!(
                    info_sink.lock().unwrap(),
                    "info depth {} seldepth {} score {} nodes {} time {} pv {}",
                    info.depth,
                    info.sel_depth,
                    score_str,
                    info.nodes,
                    info.elapsed_ms,
                    pv.join(" ")
                );
            },
            move |result| {
                let best = if result.best_move.is_null() {
                    fallback_board
                        .generate_moves()
                        .iter()
                        .next()
                        .copied()
                        .unwrap_or_else(BitMove::null)
                } else {
                    result.best_move
                };
                let mut sink = complete_sink.lock().unwrap();
                if result.ponder_move.is_null() {
                    let _ = writeln!(sink, "bestmove {}", best.stringify());
                } else {
                    let _ = writeln!(
                        sink,
                        "bestmove {} ponder {}",
                        best.stringify(),
                        result.ponder_move.stringify()
                    );
                }
            },
        );
    }

    /// Trips the stop flag (if a search is running) and blocks until the
    /// search thread has exited. `bestmove` has already been printed by the
    /// `go`-time completion callback by the time this returns -- a search
    /// that concluded on its own before `stop` arrived has already reported
    /// itself, and this just joins the now-finished thread.
    fn stop(&mut self) {
        if !self.pool.is_searching() {
            return;
        }
        self.pool.stop();
        self.pool.wait_for_finish();
    }

    fn apply_option(&mut self, full_command: &str, output: &Sink) {
        let mut args = full_command.split_whitespace();
        args.next();
        match args.next() {
            Some("name") => {}
            _ => {
                let _ = writeln!(
                    output.lock().unwrap(),
                    "info string setoption name [name] [value ...]"
                );
                return;
            }
        }

        let mut name = String::new();
        match args.next() {
            Some(first) => name += first,
            None => {
                let _ = writeln!(output.lock().unwrap(), "info string setoption name [name]");
                return;
            }
        }

        let mut value = String::new();
        while let Some(part) = args.next() {
            if part == "value" {
                value = args.collect::<Vec<_>>().join(" ");
                break;
            }
            name += " ";
            name += part;
        }

        if !self.options.apply_option(&name, &value) {
            let _ = writeln!(
                output.lock().unwrap(),
                "info string unable to apply option '{}'",
                name
            );
            return;
        }
        self.apply_all_options(output);
    }

    fn apply_all_options(&mut self, output: &Sink) {
        while let Some(work) = self.options.work() {
            match work {
                OptionWork::ClearTT => self.pool.clear_tt(),
                OptionWork::ResizeTT(mb) => self.pool.resize_tt(mb),
                OptionWork::Threads(n) => self.pool.set_num_threads(n),
                OptionWork::MoveOverhead(ms) => self.pool.set_move_overhead(ms),
                OptionWork::SyzygyPath(path) => {
                    if !path.is_empty() {
                        warn!("SyzygyPath set to '{}' but no tablebase probing library is linked in", path);
                        let _ = writeln!(
                            output.lock().unwrap(),
                            "info string SyzygyPath accepted but no tablebase support is compiled in"
                        );
                    }
                }
            }
        }
    }

    fn uci_startup(&self, output: &Sink) {
        let mut sink = output.lock().unwrap();
        let _ = writeln!(sink, "id name {} {}", ID_NAME, VERSION);
        let _ = writeln!(sink, "id author {}", ID_AUTHORS);
        for line in self.options_display() {
            let _ = writeln!(sink, "{}", line);
        }
        let _ = writeln!(sink, "uciok");
    }

    fn options_display(&self) -> Vec<String> {
        self.options.map.iter().map(|o| o.display()).collect()
    }
}

impl Default for Engine {
    fn default() -> Engine {
        Engine::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// A `Write` handle over a shared buffer: `run()` takes its sink by
    /// value, so tests keep one clone to hand in and another to read back
    /// once the background search thread (if any) has been joined.
    #[derive(Clone)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn new() -> SharedBuf {
            SharedBuf(Arc::new(Mutex::new(Vec::new())))
        }

        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn isready_replies_readyok() {
        let mut engine = Engine::new();
        let input = Cursor::new(b"isready\nquit\n".to_vec());
        let out = SharedBuf::new();
        engine.run(input, out.clone());
        assert!(out.contents().contains("readyok"));
    }

    #[test]
    fn position_command_updates_board() {
        let mut engine = Engine::new();
        let input = Cursor::new(b"position startpos moves e2e4\nquit\n".to_vec());
        engine.run(input, SharedBuf::new());
        assert_eq!(engine.board.moves_played(), 1);
    }

    #[test]
    fn setoption_hash_resizes_table() {
        let mut engine = Engine::new();
        let input = Cursor::new(b"setoption name Hash value 16\nquit\n".to_vec());
        let out = SharedBuf::new();
        engine.run(input, out.clone());
        // A successful resize leaves no error message on stdout.
        assert!(!out.contents().contains("unable to apply"));
    }

    #[test]
    fn go_depth_one_from_startpos_reports_a_move() {
        let mut engine = Engine::new();
        let input = Cursor::new(b"position startpos\ngo depth 1\nquit\n".to_vec());
        let out = SharedBuf::new();
        engine.run(input, out.clone());
        assert!(out.contents().contains("bestmove"));
    }

    #[test]
    fn go_depth_one_reports_bestmove_without_a_stop_command() {
        // No `stop`/`quit` follows `go` here: the search must conclude and
        // print `bestmove` on its own once it hits the depth limit, not
        // only in response to an explicit `stop`.
        let mut engine = Engine::new();
        let input = Cursor::new(b"position startpos\ngo depth 1\n".to_vec());
        let out = SharedBuf::new();
        engine.run(input, out.clone());
        engine.pool.wait_for_finish();
        assert!(out.contents().contains("bestmove"));
    }
}
