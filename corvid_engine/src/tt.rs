//! The transposition table: a fixed-size, lock-free hash table mapping a
//! Zobrist key to the best move and score found for that position.
//!
//! Each slot is two `AtomicU64` words -- a 16-byte entry matching the data
//! model in full: a 64-bit hash, a packed move/score/depth/bound payload.
//! The key word is stored XORed with the payload (the "implementations may
//! XOR the key with the payload to detect torn entries" scheme), so a
//! reader that observes one word mid-write reconstructs a hash that won't
//! match and discards the entry rather than trusting a torn read. No locks
//! are required; a concurrent writer can race a reader, but the worst
//! outcome is a stale or rejected entry, never a garbled one.

use std::sync::atomic::{AtomicU64, Ordering};

use corvid_core::core::score::{Value, MATE_VALUE};
use corvid_core::BitMove;

use crate::consts::MAX_PLY;

/// Scores at or beyond this magnitude are a forced mate (or a tablebase
/// win/loss close enough to one) and need their ply-distance rebased when
/// they cross the TT boundary; anything milder is ply-independent and
/// stored as-is.
const MATE_IN_MAX_PLY: Value = MATE_VALUE - MAX_PLY as Value;

/// Rebases a score measured from the current node (`ply` plies from the
/// root) to one measured from the root, for storage. A mate found 3 plies
/// from here is a mate-in-(3+ply) from the root, so a "losing" mate score
/// (from this side's perspective) grows by `ply`; a winning one shrinks.
pub fn score_to_tt(score: Value, ply: u16) -> Value {
    let ply = ply as Value;
    if score >= MATE_IN_MAX_PLY {
        score + ply
    } else if score <= -MATE_IN_MAX_PLY {
        score - ply
    } else {
        score
    }
}

/// Inverse of [`score_to_tt`]: rebases a root-relative stored score back to
/// one measured from the current node.
pub fn score_from_tt(score: Value, ply: u16) -> Value {
    let ply = ply as Value;
    if score >= MATE_IN_MAX_PLY {
        score - ply
    } else if score <= -MATE_IN_MAX_PLY {
        score + ply
    } else {
        score
    }
}

/// What kind of bound a stored score represents, relative to the window the
/// entry was produced with.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Bound {
    None,
    /// The true score is at most the stored score (a fail-low / alpha bound).
    Upper,
    /// The true score is at least the stored score (a fail-high / beta bound).
    Lower,
    /// The stored score is exact.
    Exact,
}

impl Bound {
    fn to_bits(self) -> u64 {
        match self {
            Bound::None => 0,
            Bound::Upper => 1,
            Bound::Lower => 2,
            Bound::Exact => 3,
        }
    }

    fn from_bits(bits: u64) -> Bound {
        match bits & 0b11 {
            1 => Bound::Upper,
            2 => Bound::Lower,
            3 => Bound::Exact,
            _ => Bound::None,
        }
    }
}

/// A decoded transposition-table hit.
#[derive(Copy, Clone, Debug)]
pub struct TTEntry {
    pub best_move: BitMove,
    pub score: Value,
    pub depth: i16,
    pub bound: Bound,
}

const MOVE_SHIFT: u32 = 0;
const SCORE_SHIFT: u32 = 16;
const DEPTH_SHIFT: u32 = 48;
const BOUND_SHIFT: u32 = 56;

/// Packs the move/score/depth/bound payload into one 64-bit word: 16 bits
/// of move, 32 of score, 8 of depth, 8 of bound -- the non-hash half of the
/// spec's 16-byte entry.
fn pack_data(mv: BitMove, score: Value, depth: i16, bound: Bound) -> u64 {
    let mv_bits = mv.get_raw() as u64;
    let score_bits = (score as u32) as u64;
    let depth_bits = (depth.clamp(0, 255) as u8) as u64;
    (mv_bits << MOVE_SHIFT)
        | (score_bits << SCORE_SHIFT)
        | (depth_bits << DEPTH_SHIFT)
        | (bound.to_bits() << BOUND_SHIFT)
}

/// A single slot: the 64-bit hash (stored XORed with the data word) plus
/// the packed payload, 16 bytes total.
struct Slot {
    key: AtomicU64,
    data: AtomicU64,
}

impl Slot {
    fn new() -> Slot {
        Slot {
            key: AtomicU64::new(0),
            data: AtomicU64::new(0),
        }
    }
}

/// A fixed-size transposition table, shared across search threads behind an
/// `Arc`. Resizing replaces the backing storage wholesale; it is the
/// caller's responsibility not to resize mid-search.
pub struct TranspositionTable {
    table: Vec<Slot>,
    mask: usize,
}

impl TranspositionTable {
    /// Builds a table sized to roughly `mb` megabytes, rounded down to the
    /// nearest power of two number of slots (8 bytes each).
    pub fn new(mb: usize) -> TranspositionTable {
        let bytes = mb.max(1) * 1024 * 1024;
        let mut slots = (bytes / std::mem::size_of::<u64>()).max(1);
        slots = slots.next_power_of_two() >> 1;
        let slots = slots.max(1024);
        let mut table = Vec::with_capacity(slots);
        for _ in 0..slots {
            table.push(Slot::new());
        }
        TranspositionTable {
            table,
            mask: slots - 1,
        }
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key as usize) & self.mask
    }

    /// Looks up `key`, returning the decoded entry if the de-XORed key word
    /// reconstructs the full 64-bit hash exactly -- a genuine full-key
    /// compare, and one that also rejects a torn read (a read that caught
    /// one word mid-store almost never XORs back to a real hash).
    pub fn probe(&self, key: u64) -> Option<TTEntry> {
        let slot = &self.table[self.index(key)];
        let data = slot.data.load(Ordering::Relaxed);
        let stored_key = slot.key.load(Ordering::Relaxed);
        if data == 0 && stored_key == 0 {
            return None;
        }
        if stored_key ^ data != key {
            return None;
        }
        let mv = BitMove::new((data >> MOVE_SHIFT) as u16);
        let score = (data >> SCORE_SHIFT) as u32 as Value;
        let depth = ((data >> DEPTH_SHIFT) & 0xFF) as i16;
        let bound = Bound::from_bits(data >> BOUND_SHIFT);
        if bound == Bound::None {
            return None;
        }
        Some(TTEntry {
            best_move: mv,
            score,
            depth,
            bound,
        })
    }

    /// Stores a result for `key`, unless an existing entry for the same
    /// slot was searched to a meaningfully greater depth. Per the
    /// overwrite policy, a new entry at depth `d` may replace one stored at
    /// depth up to `d + 4` -- a shallower re-search from a different move
    /// order is still allowed to refresh a near-equal-depth entry.
    pub fn store(&self, key: u64, mv: BitMove, score: Value, depth: i16, bound: Bound) {
        let slot = &self.table[self.index(key)];
        let existing_data = slot.data.load(Ordering::Relaxed);
        let existing_key = slot.key.load(Ordering::Relaxed);
        let occupied = existing_data != 0 || existing_key != 0;
        let matches_this_key = occupied && existing_key ^ existing_data == key;
        if matches_this_key {
            let stored_depth = ((existing_data >> DEPTH_SHIFT) & 0xFF) as i16;
            if stored_depth > depth + 4 && bound != Bound::Exact {
                return;
            }
        }
        // A fail-low store with no best move of its own keeps whatever move
        // was already there, so a later probe can still use it for ordering.
        let mv = if mv.is_null() && matches_this_key {
            BitMove::new((existing_data >> MOVE_SHIFT) as u16)
        } else {
            mv
        };
        let data = pack_data(mv, score, depth, bound);
        slot.data.store(data, Ordering::Relaxed);
        slot.key.store(key ^ data, Ordering::Relaxed);
    }

    /// Zeroes every slot.
    pub fn clear(&self) {
        for slot in &self.table {
            slot.data.store(0, Ordering::Relaxed);
            slot.key.store(0, Ordering::Relaxed);
        }
    }

    /// Fraction of slots currently occupied, in permille, the way UCI
    /// `info hashfull` reports it.
    pub fn hashfull_permille(&self) -> u32 {
        let sample = self.table.len().min(1000);
        if sample == 0 {
            return 0;
        }
        let used = self.table[..sample]
            .iter()
            .filter(|s| s.data.load(Ordering::Relaxed) != 0 || s.key.load(Ordering::Relaxed) != 0)
            .count();
        ((used * 1000) / sample) as u32
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_core::core::piece_move::PreMoveInfo;
    use corvid_core::core::sq::SQ;
    use corvid_core::core::piece_move::MoveFlag;

    fn mv() -> BitMove {
        BitMove::init(PreMoveInfo {
            src: SQ::E2,
            dst: SQ::E4,
            flags: MoveFlag::DoublePawnPush,
        })
    }

    #[test]
    fn store_then_probe_round_trips() {
        let tt = TranspositionTable::new(1);
        let key = 0xDEAD_BEEF_1234_5678u64;
        tt.store(key, mv(), 42, 6, Bound::Exact);
        let entry = tt.probe(key).unwrap();
        assert_eq!(entry.best_move, mv());
        assert_eq!(entry.score, 42);
        assert_eq!(entry.depth, 6);
        assert_eq!(entry.bound, Bound::Exact);
    }

    #[test]
    fn shallow_store_does_not_overwrite_much_deeper_entry() {
        let tt = TranspositionTable::new(1);
        let key = 0x1111_2222_3333_4444u64;
        tt.store(key, mv(), 10, 20, Bound::Exact);
        tt.store(key, mv(), -10, 5, Bound::Upper);
        let entry = tt.probe(key).unwrap();
        assert_eq!(entry.depth, 20);
    }

    #[test]
    fn exact_bound_overwrites_a_deeper_entry() {
        let tt = TranspositionTable::new(1);
        let key = 0x5555_6666_7777_8888u64;
        tt.store(key, mv(), 10, 20, Bound::Upper);
        tt.store(key, mv(), 99, 3, Bound::Exact);
        let entry = tt.probe(key).unwrap();
        assert_eq!(entry.depth, 3);
        assert_eq!(entry.score, 99);
        assert_eq!(entry.bound, Bound::Exact);
    }

    #[test]
    fn clear_empties_table() {
        let tt = TranspositionTable::new(1);
        let key = 7;
        tt.store(key, mv(), 1, 1, Bound::Exact);
        tt.clear();
        assert!(tt.probe(key).is_none());
    }

    #[test]
    fn mate_score_round_trips_through_store_at_different_plies() {
        let mate_in_3_from_here = MATE_VALUE - 3;
        let stored = score_to_tt(mate_in_3_from_here, 5);
        // Same forced mate, now described from the root: 3 + 5 plies away.
        assert_eq!(stored, MATE_VALUE - 3 + 5);
        let read_back = score_from_tt(stored, 5);
        assert_eq!(read_back, mate_in_3_from_here);
    }

    #[test]
    fn mate_score_read_at_a_different_ply_is_rebased_not_reused_raw() {
        let stored = score_to_tt(MATE_VALUE - 3, 5);
        let read_at_ply_2 = score_from_tt(stored, 2);
        assert_eq!(read_at_ply_2, MATE_VALUE - 3 + 5 - 2);
    }

    #[test]
    fn ordinary_score_is_unaffected_by_ply_adjustment() {
        assert_eq!(score_to_tt(37, 12), 37);
        assert_eq!(score_from_tt(37, 12), 37);
    }
}
