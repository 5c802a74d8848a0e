//! UCI search, time management and thread pool for the `corvid` chess engine.
//!
//! Board representation and move generation live in `corvid_core`; this
//! crate adds iterative-deepening alpha-beta search, a transposition table,
//! a lazy-SMP thread pool, and the UCI protocol loop on top of it.

#![allow(dead_code)]

pub mod consts;
pub mod engine;
pub mod movepick;
pub mod root_moves;
pub mod search;
pub mod tablebase;
pub mod threadpool;
pub mod time;
pub mod tt;
pub mod uci;

pub use consts::*;
