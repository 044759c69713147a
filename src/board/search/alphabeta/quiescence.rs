use super::super::constants::{INFINITY, MATE_SCORE};
use super::super::move_order::order_moves;
use super::SearchContext;
use crate::board::{Evaluator, MAX_PLY};

impl<E: Evaluator + ?Sized> SearchContext<'_, E> {
    /// Quiescence search: captures and promotions only, or every evasion
    /// when in check, until the position is quiet enough to evaluate.
    pub(crate) fn quiesce(&mut self, mut alpha: i32, beta: i32, ply: usize, qdepth: usize) -> i32 {
        self.pv.clear(ply);
        if !self.enter_node(ply) {
            return 0;
        }
        if ply >= MAX_PLY - 1 {
            return self.evaluate();
        }

        let in_check = self.pos.is_in_check(self.pos.side_to_move());
        let mut best_score;
        let moves = if in_check {
            let moves = self.pos.generate_moves();
            if moves.is_empty() {
                return -MATE_SCORE + ply as i32;
            }
            if qdepth >= self.params.qsearch_max_depth {
                return self.evaluate();
            }
            best_score = -INFINITY;
            moves
        } else {
            let stand_pat = self.evaluate();
            if stand_pat >= beta || qdepth >= self.params.qsearch_max_depth {
                return stand_pat;
            }
            alpha = alpha.max(stand_pat);
            best_score = stand_pat;
            self.pos.generate_tactical_moves()
        };

        let ordered = order_moves(
            &moves,
            &self.pos,
            None,
            &self.tables.killers,
            &self.tables.history,
            ply,
        );

        for scored in ordered.iter() {
            let mv = scored.mv;
            let info = self.pos.make_move(mv);
            let score = -self.quiesce(-beta, -alpha, ply + 1, qdepth + 1);
            self.pos.unmake_move(mv, info);

            if self.stopped.is_some() {
                return 0;
            }
            if score > best_score {
                best_score = score;
                if score > alpha {
                    alpha = score;
                    if score >= beta {
                        break;
                    }
                }
            }
        }

        best_score
    }
}
