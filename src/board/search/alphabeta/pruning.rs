use super::super::constants::{MATE_SCORE, MATE_THRESHOLD};
use super::SearchContext;
use crate::board::Evaluator;

impl<E: Evaluator + ?Sized> SearchContext<'_, E> {
    /// Narrow the window to the best and worst mate still reachable from
    /// `ply`; returns a score when the window closes.
    pub(super) fn mate_distance_prune(alpha: &mut i32, beta: &mut i32, ply: usize) -> Option<i32> {
        let ply = ply as i32;
        *alpha = (*alpha).max(-MATE_SCORE + ply);
        *beta = (*beta).min(MATE_SCORE - ply - 1);
        (*alpha >= *beta).then_some(*alpha)
    }

    /// Null move pruning: give the opponent a free move and search the
    /// result at reduced depth. If we still fail high the node is cut.
    ///
    /// Skipped in pawn-only endings, where zugzwang makes the free move
    /// an advantage for the side receiving it.
    pub(super) fn try_null_move(&mut self, depth: u32, beta: i32, ply: usize) -> Option<i32> {
        let params = self.params;
        if !params.null_move
            || depth < params.null_min_depth
            || beta.abs() >= MATE_THRESHOLD
            || !self.pos.has_non_pawn_material(self.pos.side_to_move())
            || self.evaluate() < beta
        {
            return None;
        }

        let reduced = depth.saturating_sub(params.null_reduction + 1);
        let info = self.pos.make_null_move();
        let score = -self.alphabeta(reduced, -beta, -beta + 1, ply + 1, false);
        self.pos.unmake_null_move(info);

        if self.stopped.is_some() || score < beta {
            return None;
        }
        // Unproven mates from a null-move search are not trusted.
        Some(if score >= MATE_THRESHOLD { beta } else { score })
    }
}
