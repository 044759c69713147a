//! Move ordering: killer moves, history heuristic and MVV-LVA.

use super::constants::{
    CAPTURE_BASE_SCORE, HISTORY_MAX, KILLER1_SCORE, KILLER2_SCORE, PROMOTION_BONUS, TT_MOVE_SCORE,
};
use crate::board::{Move, MoveList, Piece, Position, ScoredMoveList, EMPTY_MOVE, MAX_PLY};

/// Two quiet moves per ply that recently caused a beta cutoff.
#[derive(Clone, Debug)]
pub struct KillerTable {
    slots: [[Move; 2]; MAX_PLY],
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KillerTable {
    #[must_use]
    pub fn new() -> Self {
        KillerTable {
            slots: [[EMPTY_MOVE; 2]; MAX_PLY],
        }
    }

    #[must_use]
    pub fn primary(&self, ply: usize) -> Move {
        self.slots.get(ply).map_or(EMPTY_MOVE, |row| row[0])
    }

    #[must_use]
    pub fn secondary(&self, ply: usize) -> Move {
        self.slots.get(ply).map_or(EMPTY_MOVE, |row| row[1])
    }

    /// Record a cutoff move; the previous primary killer becomes secondary.
    pub fn update(&mut self, ply: usize, mv: Move) {
        let Some(row) = self.slots.get_mut(ply) else {
            return;
        };
        if row[0] != mv {
            row[1] = row[0];
            row[0] = mv;
        }
    }

    pub fn reset(&mut self) {
        self.slots = [[EMPTY_MOVE; 2]; MAX_PLY];
    }
}

/// Butterfly history: a cutoff score per (from, to) pair.
#[derive(Clone, Debug)]
pub struct HistoryTable {
    entries: [i32; 4096],
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryTable {
    #[must_use]
    pub fn new() -> Self {
        HistoryTable { entries: [0; 4096] }
    }

    #[inline]
    fn index(mv: Move) -> usize {
        mv.from().index() * 64 + mv.to().index()
    }

    #[must_use]
    pub fn score(&self, mv: Move) -> i32 {
        self.entries[Self::index(mv)]
    }

    /// Reward a quiet move that caused a beta cutoff at `depth`.
    pub fn update(&mut self, mv: Move, depth: u32) {
        let bonus = (depth * depth).min(HISTORY_MAX as u32) as i32;
        let entry = &mut self.entries[Self::index(mv)];
        *entry = (*entry + bonus).min(HISTORY_MAX);
    }

    /// Penalize a quiet move that was searched before the cutoff move.
    pub fn penalize(&mut self, mv: Move, depth: u32) {
        let penalty = (depth * depth).min(HISTORY_MAX as u32) as i32;
        let entry = &mut self.entries[Self::index(mv)];
        *entry = (*entry - penalty).max(-HISTORY_MAX);
    }

    pub fn decay(&mut self, shift: u32) {
        let shift = shift.min(31);
        for entry in &mut self.entries {
            *entry >>= shift;
        }
    }

    pub fn reset(&mut self) {
        self.entries = [0; 4096];
    }
}

/// Most valuable victim, least valuable attacker.
#[must_use]
pub(crate) fn mvv_lva(pos: &Position, mv: Move) -> i32 {
    let attacker = pos.piece_on(mv.from()).map_or(0, Piece::value);
    let victim = if mv.is_en_passant() {
        Piece::Pawn.value()
    } else {
        pos.piece_on(mv.to()).map_or(0, Piece::value)
    };
    victim * 10 - attacker
}

fn score_move(
    pos: &Position,
    mv: Move,
    tt_move: Option<Move>,
    killers: &KillerTable,
    history: &HistoryTable,
    ply: usize,
) -> i32 {
    if Some(mv) == tt_move {
        return TT_MOVE_SCORE;
    }
    if mv.is_tactical() {
        let mut score = CAPTURE_BASE_SCORE;
        if mv.is_capture() {
            score += mvv_lva(pos, mv);
        }
        if let Some(promo) = mv.promotion() {
            score += PROMOTION_BONUS + promo.value();
        }
        return score;
    }
    if mv == killers.primary(ply) {
        KILLER1_SCORE
    } else if mv == killers.secondary(ply) {
        KILLER2_SCORE
    } else {
        history.score(mv)
    }
}

/// Score and sort `moves` for search at `ply`.
///
/// The TT move comes first, then captures and promotions by MVV-LVA, then
/// this ply's killers, then the remaining quiet moves by history score.
/// Equal scores keep their generation order.
#[must_use]
pub fn order_moves(
    moves: &MoveList,
    pos: &Position,
    tt_move: Option<Move>,
    killers: &KillerTable,
    history: &HistoryTable,
    ply: usize,
) -> ScoredMoveList {
    let mut scored = ScoredMoveList::new();
    for &mv in moves {
        scored.push(mv, score_move(pos, mv, tt_move, killers, history, ply));
    }
    scored.sort_by_score_desc();
    scored
}
