//! Move ordering: a `MovePicker` is an explicit state machine stepping
//! through TT move, captures (good then bad, split by static exchange
//! evaluation), killers, and finally quiet moves ordered by history score.
//! Driving it through an enum rather than a lazy generator keeps every
//! intermediate buffer a plain `Vec`/`ScoringMoveList`, with no hidden
//! coroutine state to reason about.

use corvid_core::core::piece_move::MoveType;
use corvid_core::core::score::{piece_type_value, Value};
use corvid_core::core::sq::SQ;
use corvid_core::{BitBoard, BitMove, Board, PieceType, Player};

pub const MAX_KILLERS_PER_PLY: usize = 2;
/// Clamp applied to history scores so that one wildly successful move can't
/// dominate ordering forever.
pub const HISTORY_MAX: i32 = 30_000;

/// Per-thread history heuristic: how often a quiet move (indexed by player,
/// source and destination square) has caused a beta cutoff.
pub struct HistoryTable {
    table: Box<[[[i32; 64]; 64]; 2]>,
}

impl HistoryTable {
    pub fn new() -> HistoryTable {
        HistoryTable {
            table: Box::new([[[0; 64]; 64]; 2]),
        }
    }

    #[inline]
    pub fn get(&self, player: Player, from: SQ, to: SQ) -> i32 {
        self.table[player as usize][from.0 as usize][to.0 as usize]
    }

    /// Rewards `m` and decays every other quiet move tried at this node, the
    /// standard "gravity" update that keeps history scores bounded without
    /// a periodic reset.
    pub fn update(&mut self, player: Player, best: BitMove, tried: &[BitMove], depth: i16) {
        let bonus = (depth as i32 * 100).min(1500);
        for &m in tried {
            let from = m.get_src();
            let to = m.get_dest();
            let entry = &mut self.table[player as usize][from.0 as usize][to.0 as usize];
            let delta = if m == best { bonus } else { -bonus };
            *entry += delta - (*entry * delta.abs()) / HISTORY_MAX;
            *entry = (*entry).clamp(-HISTORY_MAX, HISTORY_MAX);
        }
    }

    pub fn clear(&mut self) {
        *self.table = [[[0; 64]; 64]; 2];
    }
}

/// Per thread: the quiet move that most recently refuted a given previous
/// move, indexed by the previous move's (from, to). Tried after killers,
/// before the rest of the quiets.
pub struct CounterMoveTable {
    table: Box<[[BitMove; 64]; 64]>,
}

impl CounterMoveTable {
    pub fn new() -> CounterMoveTable {
        CounterMoveTable {
            table: Box::new([[BitMove::null(); 64]; 64]),
        }
    }

    #[inline]
    pub fn get(&self, prev: BitMove) -> BitMove {
        if prev.is_null() {
            return BitMove::null();
        }
        self.table[prev.get_src().0 as usize][prev.get_dest().0 as usize]
    }

    pub fn update(&mut self, prev: BitMove, refutation: BitMove) {
        if prev.is_null() {
            return;
        }
        self.table[prev.get_src().0 as usize][prev.get_dest().0 as usize] = refutation;
    }

    pub fn clear(&mut self) {
        *self.table = [[BitMove::null(); 64]; 64];
    }
}

/// Killer moves: up to two quiet moves per ply that caused a beta cutoff the
/// last time this ply was reached, tried before other quiets.
#[derive(Copy, Clone, Default)]
pub struct Killers {
    moves: [BitMove; MAX_KILLERS_PER_PLY],
}

impl Killers {
    pub fn new() -> Killers {
        Killers {
            moves: [BitMove::null(); MAX_KILLERS_PER_PLY],
        }
    }

    pub fn contains(&self, m: BitMove) -> bool {
        self.moves.contains(&m)
    }

    pub fn update(&mut self, m: BitMove) {
        if self.moves[0] != m {
            self.moves[1] = self.moves[0];
            self.moves[0] = m;
        }
    }

    pub fn moves(&self) -> [BitMove; MAX_KILLERS_PER_PLY] {
        self.moves
    }
}

/// Static exchange evaluation: simulates the sequence of captures on
/// `to` and returns the net material gain (in centipawns) of playing `m`,
/// from the mover's perspective. Used to split captures into "good" (likely
/// winning or even) and "bad" (likely losing material).
pub fn see(board: &Board, m: BitMove) -> Value {
    let to = m.get_dest();
    let from = m.get_src();
    if m.move_type() == MoveType::Castle {
        return 0;
    }

    let mut gain: [Value; 32] = [0; 32];
    let mut depth: usize = 0;

    let mut occupied = board.occupied();
    let mut moving_value = if m.is_promo() {
        piece_type_value(m.promo_piece())
    } else {
        piece_type_value(board.piece_at_sq(from).type_of())
    };
    gain[0] = if m.is_en_passant() {
        piece_type_value(PieceType::P)
    } else {
        piece_type_value(board.piece_at_sq(to).type_of())
    };
    occupied ^= from.to_bb();
    let mut side = board.turn().other_player();

    loop {
        let side_attackers = board.attackers_to(to, occupied) & occupied & board.get_occupied_player(side);
        if side_attackers.is_empty() || depth >= 31 {
            break;
        }
        let next_sq = least_valuable_attacker(board, side_attackers);
        depth += 1;
        gain[depth] = moving_value - gain[depth - 1];
        if gain[depth].max(-gain[depth - 1]) < 0 {
            break;
        }
        moving_value = piece_type_value(board.piece_at_sq(next_sq).type_of());
        occupied ^= next_sq.to_bb();
        side = side.other_player();
    }

    while depth > 0 {
        depth -= 1;
        gain[depth] = -gain[depth + 1].max(-gain[depth]);
    }
    gain[0]
}

fn least_valuable_attacker(board: &Board, attackers: BitBoard) -> SQ {
    let mut best_sq = attackers.to_sq();
    let mut best_value = Value::MAX;
    let mut remaining = attackers;
    while remaining.is_not_empty() {
        let sq = remaining.pop_lsb();
        let v = piece_type_value(board.piece_at_sq(sq).type_of());
        if v < best_value {
            best_value = v;
            best_sq = sq;
        }
    }
    best_sq
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Stage {
    TTMove,
    GenerateCaptures,
    QueenPromotions,
    GoodCaptures,
    Killers,
    CounterMove,
    GenerateQuiets,
    Quiets,
    BadCaptures,
    UnderPromotions,
    Done,
}

/// Drives move ordering for one node: call `next` repeatedly until it
/// returns `None`. Moves already handed out are never repeated.
pub struct MovePicker {
    stage: Stage,
    tt_move: BitMove,
    killers: [BitMove; MAX_KILLERS_PER_PLY],
    counter_move: BitMove,
    queen_promotions: Vec<BitMove>,
    good_captures: Vec<BitMove>,
    bad_captures: Vec<BitMove>,
    under_promotions: Vec<BitMove>,
    quiets: Vec<BitMove>,
    queen_promo_idx: usize,
    good_idx: usize,
    killer_idx: usize,
    quiet_idx: usize,
    bad_idx: usize,
    under_promo_idx: usize,
}

impl MovePicker {
    pub fn new(
        tt_move: BitMove,
        killers: [BitMove; MAX_KILLERS_PER_PLY],
        counter_move: BitMove,
    ) -> MovePicker {
        MovePicker {
            stage: Stage::TTMove,
            tt_move,
            killers,
            counter_move,
            queen_promotions: Vec::new(),
            good_captures: Vec::new(),
            bad_captures: Vec::new(),
            under_promotions: Vec::new(),
            quiets: Vec::new(),
            queen_promo_idx: 0,
            good_idx: 0,
            killer_idx: 0,
            quiet_idx: 0,
            bad_idx: 0,
            under_promo_idx: 0,
        }
    }

    /// Returns the next move to try, given the board to generate/score
    /// moves against and the history table used to order quiets.
    pub fn next(&mut self, board: &Board, history: &HistoryTable) -> Option<BitMove> {
        loop {
            match self.stage {
                Stage::TTMove => {
                    self.stage = Stage::GenerateCaptures;
                    if !self.tt_move.is_null()
                        && board.pseudo_legal_move(self.tt_move)
                        && board.legal_move(self.tt_move)
                    {
                        return Some(self.tt_move);
                    }
                }
                Stage::GenerateCaptures => {
                    let captures = board.generate_moves_of_type(
                        corvid_core::core::GenTypes::Captures,
                    );
                    for &m in captures.iter() {
                        if m == self.tt_move {
                            continue;
                        }
                        // Queen promotions rank above every capture; every
                        // other promotion ranks below every quiet move --
                        // neither is subject to the SEE good/bad split.
                        if m.is_promo() {
                            if m.promo_piece() == PieceType::Q {
                                self.queen_promotions.push(m);
                            } else {
                                self.under_promotions.push(m);
                            }
                        } else if see(board, m) >= 0 {
                            self.good_captures.push(m);
                        } else {
                            self.bad_captures.push(m);
                        }
                    }
                    self.good_captures
                        .sort_by_key(|&m| std::cmp::Reverse(mvv_lva(board, m)));
                    self.stage = Stage::QueenPromotions;
                }
                Stage::QueenPromotions => {
                    if self.queen_promo_idx < self.queen_promotions.len() {
                        let m = self.queen_promotions[self.queen_promo_idx];
                        self.queen_promo_idx += 1;
                        return Some(m);
                    }
                    self.stage = Stage::GoodCaptures;
                }
                Stage::GoodCaptures => {
                    if self.good_idx < self.good_captures.len() {
                        let m = self.good_captures[self.good_idx];
                        self.good_idx += 1;
                        return Some(m);
                    }
                    self.stage = Stage::Killers;
                }
                Stage::Killers => {
                    while self.killer_idx < self.killers.len() {
                        let k = self.killers[self.killer_idx];
                        self.killer_idx += 1;
                        if k != self.tt_move
                            && !k.is_null()
                            && board.pseudo_legal_move(k)
                            && !k.is_capture()
                            && board.legal_move(k)
                        {
                            return Some(k);
                        }
                    }
                    self.stage = Stage::CounterMove;
                }
                Stage::CounterMove => {
                    self.stage = Stage::GenerateQuiets;
                    let c = self.counter_move;
                    if c != self.tt_move
                        && !c.is_null()
                        && !self.killers.contains(&c)
                        && board.pseudo_legal_move(c)
                        && !c.is_capture()
                        && board.legal_move(c)
                    {
                        return Some(c);
                    }
                }
                Stage::GenerateQuiets => {
                    let quiets = board.generate_moves_of_type(
                        corvid_core::core::GenTypes::Quiets,
                    );
                    let turn = board.turn();
                    for &m in quiets.iter() {
                        if m == self.tt_move || self.killers.contains(&m) || m == self.counter_move
                        {
                            continue;
                        }
                        self.quiets.push(m);
                    }
                    self.quiets.sort_by_key(|&m| {
                        std::cmp::Reverse(history.get(turn, m.get_src(), m.get_dest()))
                    });
                    self.stage = Stage::Quiets;
                }
                Stage::Quiets => {
                    if self.quiet_idx < self.quiets.len() {
                        let m = self.quiets[self.quiet_idx];
                        self.quiet_idx += 1;
                        return Some(m);
                    }
                    self.stage = Stage::BadCaptures;
                }
                Stage::BadCaptures => {
                    if self.bad_idx < self.bad_captures.len() {
                        let m = self.bad_captures[self.bad_idx];
                        self.bad_idx += 1;
                        return Some(m);
                    }
                    self.stage = Stage::UnderPromotions;
                }
                Stage::UnderPromotions => {
                    if self.under_promo_idx < self.under_promotions.len() {
                        let m = self.under_promotions[self.under_promo_idx];
                        self.under_promo_idx += 1;
                        return Some(m);
                    }
                    self.stage = Stage::Done;
                }
                Stage::Done => return None,
            }
        }
    }
}

pub(crate) fn mvv_lva(board: &Board, m: BitMove) -> i32 {
    let attacker = board.piece_at_sq(m.get_src()).type_of();
    let victim = if m.is_en_passant() {
        PieceType::P
    } else {
        board.piece_at_sq(m.get_dest()).type_of()
    };
    piece_type_value(victim) * 16 - piece_type_value(attacker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_core::Board;

    #[test]
    fn see_of_free_capture_is_positive() {
        let board = Board::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let m = board
            .generate_moves()
            .iter()
            .find(|m| m.stringify() == "e4d5")
            .copied()
            .unwrap();
        assert!(see(&board, m) > 0);
    }

    #[test]
    fn move_picker_exhausts_all_legal_moves_from_start_pos() {
        let board = Board::start_pos();
        let history = HistoryTable::new();
        let mut picker = MovePicker::new(
            BitMove::null(),
            [BitMove::null(); MAX_KILLERS_PER_PLY],
            BitMove::null(),
        );
        let mut seen = Vec::new();
        while let Some(m) = picker.next(&board, &history) {
            seen.push(m);
        }
        assert_eq!(seen.len(), 20);
    }

    #[test]
    fn move_picker_with_counter_move_still_exhausts_all_legal_moves() {
        let board = Board::start_pos();
        let history = HistoryTable::new();
        let counter = board.generate_moves()[5];
        let mut picker = MovePicker::new(
            BitMove::null(),
            [BitMove::null(); MAX_KILLERS_PER_PLY],
            counter,
        );
        let mut seen = Vec::new();
        while let Some(m) = picker.next(&board, &history) {
            seen.push(m);
        }
        seen.sort_by_key(|m| m.get_raw());
        let mut expected: Vec<BitMove> = board.generate_moves().vec();
        expected.sort_by_key(|m| m.get_raw());
        assert_eq!(seen, expected);
    }

    #[test]
    fn counter_move_table_round_trips() {
        let mut table = CounterMoveTable::new();
        let board = Board::start_pos();
        let prev = board.generate_moves()[0];
        let refutation = board.generate_moves()[1];
        assert!(table.get(prev).is_null());
        table.update(prev, refutation);
        assert_eq!(table.get(prev), refutation);
    }
}
