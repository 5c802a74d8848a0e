//! Functions for parsing UCI input, including both time data & the position of the board to be searched.

use corvid_core::board::FenBuildError;
use corvid_core::{BitMove, Board};
use thiserror::Error;

use crate::time::GoLimits;

/// A malformed `position` command -- a protocol error (spec-wise, distinct
/// from a contract violation), surfaced as `info string` and otherwise
/// ignored rather than crashing the engine.
#[derive(Error, Debug)]
pub enum PositionError {
    #[error("position requires 'startpos' or 'fen <fen>'")]
    MissingStartToken,
    #[error("invalid fen: {0}")]
    BadFen(#[from] FenBuildError),
    #[error("illegal or unrecognized move '{0}' in moves list")]
    IllegalMove(String),
}

fn is_keyword(arg: &str) -> bool {
    matches!(
        arg,
        "searchmoves"
            | "ponder"
            | "wtime"
            | "btime"
            | "winc"
            | "binc"
            | "movestogo"
            | "depth"
            | "nodes"
            | "mate"
            | "movetime"
            | "infinite"
    )
}

/// Parses the arguments following `go`, returning the clock/depth/node
/// limits plus any `searchmoves` restriction (as raw UCI move strings --
/// resolving them against the current board is the caller's job, since this
/// function has no board to check legality against).
///
/// ```text
/// "searchmoves" "move"+
/// "ponder"
/// "wtime" "[msec]"
/// "btime" "[msec]"
/// "winc" "[msec]"
/// "binc" "[msec]"
/// "movestogo" "[u32]"
/// "depth" "[u16]"
/// "nodes" "[u64]"
/// "mate" "[moves]"
/// "movetime" "[msec]"
/// "infinite"
/// ```
pub fn parse_go(args: &[&str]) -> (GoLimits, Vec<String>) {
    let mut limit = GoLimits::default();
    let mut search_moves = Vec::new();
    let mut token_idx: usize = 0;
    while let Some(token) = args.get(token_idx) {
        match *token {
            "infinite" => limit.infinite = true,
            "ponder" => {}
            "wtime" => {
                if let Some(v) = args.get(token_idx + 1).and_then(|s| s.parse::<i64>().ok()) {
                    limit.wtime = Some(v);
                    token_idx += 1;
                }
            }
            "btime" => {
                if let Some(v) = args.get(token_idx + 1).and_then(|s| s.parse::<i64>().ok()) {
                    limit.btime = Some(v);
                    token_idx += 1;
                }
            }
            "winc" => {
                if let Some(v) = args.get(token_idx + 1).and_then(|s| s.parse::<i64>().ok()) {
                    limit.winc = Some(v);
                    token_idx += 1;
                }
            }
            "binc" => {
                if let Some(v) = args.get(token_idx + 1).and_then(|s| s.parse::<i64>().ok()) {
                    limit.binc = Some(v);
                    token_idx += 1;
                }
            }
            "movestogo" => {
                if let Some(v) = args.get(token_idx + 1).and_then(|s| s.parse::<u32>().ok()) {
                    limit.movestogo = Some(v);
                    token_idx += 1;
                }
            }
            "depth" => {
                if let Some(v) = args.get(token_idx + 1).and_then(|s| s.parse::<i16>().ok()) {
                    limit.depth = Some(v);
                    token_idx += 1;
                }
            }
            "nodes" => {
                if let Some(v) = args.get(token_idx + 1).and_then(|s| s.parse::<u64>().ok()) {
                    limit.nodes = Some(v);
                    token_idx += 1;
                }
            }
            "mate" => {
                // Mate search is handled as depth-limited search in practice;
                // the value is otherwise unused here.
                token_idx += 1;
            }
            "movetime" => {
                if let Some(v) = args.get(token_idx + 1).and_then(|s| s.parse::<i64>().ok()) {
                    limit.movetime = Some(v);
                    token_idx += 1;
                }
            }
            "searchmoves" => 'searchmoves: loop {
                if let Some(mov) = args.get(token_idx + 1) {
                    if !is_keyword(mov) {
                        search_moves.push((*mov).to_string());
                        token_idx += 1;
                    } else {
                        break 'searchmoves;
                    }
                } else {
                    break 'searchmoves;
                }
            },
            _ => {}
        }
        token_idx += 1;
    }
    (limit, search_moves)
}

/// Resolves UCI move strings against the legal moves available in `board`,
/// dropping any that don't match rather than failing the whole command --
/// an unrecognized `searchmoves` entry is a protocol error, not fatal.
pub fn resolve_search_moves(board: &Board, uci_moves: &[String]) -> Vec<BitMove> {
    let legal = board.generate_moves();
    uci_moves
        .iter()
        .filter_map(|s| legal.iter().find(|m| &m.stringify() == s).copied())
        .collect()
}

fn apply_moves(board: &mut Board, args: &[&str]) -> Result<(), PositionError> {
    for mov in args {
        if !board.apply_uci_move(mov) {
            return Err(PositionError::IllegalMove((*mov).to_string()));
        }
    }
    Ok(())
}

/// Parses the arguments following `position`: either `startpos` or
/// `fen <fen>`, optionally followed by `moves <uci move>+`.
pub fn position_parse_board(args: &[&str]) -> Result<Board, PositionError> {
    if args.is_empty() {
        return Err(PositionError::MissingStartToken);
    }
    let start = args[0];
    let mut board = if start == "startpos" {
        Board::start_pos()
    } else if start == "fen" {
        let fen_string: String = args[1..]
            .iter()
            .take_while(|p| **p != "moves")
            .copied()
            .collect::<Vec<&str>>()
            .join(" ");
        Board::from_fen(&fen_string)?
    } else {
        return Err(PositionError::MissingStartToken);
    };

    if let Some(moves_start) = args.iter().position(|a| *a == "moves") {
        apply_moves(&mut board, &args[moves_start + 1..])?;
    }

    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_core::Player;

    #[test]
    fn board_parse() {
        let b_str = "position startpos moves e2e4 e7e5";
        let args: Vec<&str> = b_str.split_whitespace().collect();
        let board = position_parse_board(&args[1..]).unwrap();
        assert_eq!(board.moves_played(), 2);
        assert_eq!(board.turn(), Player::White);

        let b_str = "position startpos";
        let args: Vec<&str> = b_str.split_whitespace().collect();
        let board = position_parse_board(&args[1..]).unwrap();
        assert_eq!(board.moves_played(), 0);
    }

    #[test]
    fn fen_position_parses() {
        let b_str = "position fen rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let args: Vec<&str> = b_str.split_whitespace().collect();
        let board = position_parse_board(&args[1..]).unwrap();
        assert_eq!(board.turn(), Player::Black);
    }

    #[test]
    fn go_parse_collects_searchmoves() {
        let t_str = "go infinite searchmoves e2e4 d2d4";
        let args: Vec<&str> = t_str.split_whitespace().collect();
        let (limits, moves) = parse_go(&args[1..]);
        assert!(limits.infinite);
        assert_eq!(moves.len(), 2);
    }

    #[test]
    fn go_parse_reads_clock_fields() {
        let t_str = "go wtime 60000 btime 60000 winc 500 binc 500 movestogo 40";
        let args: Vec<&str> = t_str.split_whitespace().collect();
        let (limits, _) = parse_go(&args[1..]);
        assert_eq!(limits.wtime, Some(60_000));
        assert_eq!(limits.movestogo, Some(40));
    }

    #[test]
    fn castling_move_applies_through_uci_notation() {
        let old_str = "position startpos moves e2e4 d7d5 e4d5 d8d5 g1f3 d5e4 f1e2 c7c6 e1g1";
        let args: Vec<&str> = old_str.split_whitespace().collect();
        let board = position_parse_board(&args[1..]).unwrap();
        assert_eq!(board.moves_played(), 9);
    }

    #[test]
    fn garbage_move_reports_illegal_move_error() {
        let b_str = "position startpos moves z9z9";
        let args: Vec<&str> = b_str.split_whitespace().collect();
        let err = position_parse_board(&args[1..]).unwrap_err();
        assert!(matches!(err, PositionError::IllegalMove(_)));
    }

    #[test]
    fn malformed_fen_reports_bad_fen_error() {
        let b_str = "position fen not-a-fen";
        let args: Vec<&str> = b_str.split_whitespace().collect();
        let err = position_parse_board(&args[1..]).unwrap_err();
        assert!(matches!(err, PositionError::BadFen(_)));
    }
}
