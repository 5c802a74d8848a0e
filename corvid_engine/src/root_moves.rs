//! Tracking structure for the moves available at the search root: each root
//! move keeps the principal variation found under it so far, so the UCI
//! `info` output can report a full line rather than just a single move.

use corvid_core::core::score::{Value, UNKNOWN_SCORE};
use corvid_core::BitMove;

/// One root move and the best line found for it so far.
#[derive(Clone, Debug)]
pub struct RootMove {
    pub pv: Vec<BitMove>,
    pub score: Value,
    pub prev_score: Value,
    pub depth_reached: i16,
}

impl RootMove {
    pub fn new(m: BitMove) -> RootMove {
        RootMove {
            pv: vec![m],
            score: UNKNOWN_SCORE,
            prev_score: UNKNOWN_SCORE,
            depth_reached: 0,
        }
    }

    pub fn first_move(&self) -> BitMove {
        self.pv[0]
    }

    /// Replaces the PV below the root move with `rest`, keeping the root
    /// move itself as the head of the line.
    pub fn set_pv(&mut self, rest: &[BitMove]) {
        let head = self.pv[0];
        self.pv.clear();
        self.pv.push(head);
        self.pv.extend_from_slice(rest);
    }
}

impl PartialEq for RootMove {
    fn eq(&self, other: &RootMove) -> bool {
        self.first_move() == other.first_move()
    }
}

/// The list of root moves under consideration, kept sorted best-score-first
/// after each completed iteration.
pub struct RootMoveList {
    moves: Vec<RootMove>,
}

impl RootMoveList {
    pub fn new(moves: &[BitMove]) -> RootMoveList {
        RootMoveList {
            moves: moves.iter().map(|m| RootMove::new(*m)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<RootMove> {
        self.moves.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<RootMove> {
        self.moves.iter_mut()
    }

    /// The current best root move, after sorting.
    pub fn best(&self) -> &RootMove {
        &self.moves[0]
    }

    /// Finds the root move starting with `m`, if `m` is one of the root
    /// moves under consideration (used to restrict search to `searchmoves`).
    pub fn find_mut(&mut self, m: BitMove) -> Option<&mut RootMove> {
        self.moves.iter_mut().find(|rm| rm.first_move() == m)
    }

    pub fn contains(&self, m: BitMove) -> bool {
        self.moves.iter().any(|rm| rm.first_move() == m)
    }

    /// Restricts the list to only the given moves, in the order given, as
    /// UCI's `searchmoves` requests.
    pub fn restrict_to(&mut self, allowed: &[BitMove]) {
        if allowed.is_empty() {
            return;
        }
        self.moves.retain(|rm| allowed.contains(&rm.first_move()));
    }

    /// Sorts the list best-score-first, stable so that moves tied in score
    /// keep their prior relative order.
    pub fn sort(&mut self) {
        self.moves.sort_by(|a, b| b.score.cmp(&a.score));
    }

    /// Resets every move's score to the "not yet searched this iteration"
    /// sentinel before a new depth begins.
    pub fn prepare_for_new_iteration(&mut self) {
        for rm in &mut self.moves {
            rm.prev_score = rm.score;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_core::Board;

    #[test]
    fn new_list_contains_every_legal_move() {
        let board = Board::start_pos();
        let moves = board.generate_moves();
        let list = RootMoveList::new(&moves.vec());
        assert_eq!(list.len(), 20);
    }

    #[test]
    fn sort_orders_best_score_first() {
        let board = Board::start_pos();
        let moves = board.generate_moves();
        let mut list = RootMoveList::new(&moves.vec());
        for (i, rm) in list.iter_mut().enumerate() {
            rm.score = i as Value;
        }
        list.sort();
        assert!(list.iter().next().unwrap().score >= list.moves.last().unwrap().score);
    }
}
