use std::time::Instant;

use super::super::constants::{INFINITY, MATE_SCORE, MATE_THRESHOLD};
use super::super::IterationInfo;
use super::SearchContext;
use crate::board::{Evaluator, Move};

/// Why iterative deepening ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StopReason {
    DepthReached,
    MateFound,
    NodeLimit,
    TimeLimit,
    Stopped,
}

pub(crate) fn format_pv(pv: &[Move]) -> String {
    pv.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// True if `score` is a mate the search has fully proven at `depth`.
fn is_proven_mate(score: i32, depth: u32) -> bool {
    score.abs() >= MATE_THRESHOLD && (MATE_SCORE - score.abs()) as u32 <= depth
}

impl<E: Evaluator + ?Sized> SearchContext<'_, E> {
    /// Root search at `depth` inside an aspiration window around `previous`,
    /// widening on failure. `None` if the search was stopped first.
    fn aspiration_search(&mut self, depth: u32, previous: i32) -> Option<i32> {
        let params = self.params;
        let mut delta = params.aspiration_delta.max(1);
        let (mut alpha, mut beta) =
            if depth >= params.aspiration_min_depth && previous.abs() < MATE_THRESHOLD {
                (previous - delta, previous + delta)
            } else {
                (-INFINITY, INFINITY)
            };

        loop {
            let score = self.alphabeta(depth, alpha, beta, 0, true);
            if self.stopped.is_some() {
                return None;
            }

            if score <= alpha && alpha > -INFINITY {
                alpha = (alpha - delta).max(-INFINITY);
            } else if score >= beta && beta < INFINITY {
                beta = (beta + delta).min(INFINITY);
            } else {
                return Some(score);
            }
            delta = delta.saturating_mul(2);
            if delta > 1000 {
                alpha = -INFINITY;
                beta = INFINITY;
            }
        }
    }

    /// Iterative deepening from `first_depth` to `last_depth`. Every
    /// completed iteration is passed to `on_iteration` and returned; a
    /// partially searched iteration is discarded.
    pub(crate) fn iterative_deepening(
        &mut self,
        first_depth: u32,
        last_depth: u32,
        on_iteration: &mut dyn FnMut(&IterationInfo),
    ) -> (Vec<IterationInfo>, StopReason) {
        let mut iterations: Vec<IterationInfo> = Vec::new();
        let mut score = 0;

        for depth in first_depth..=last_depth {
            self.poll_signals();
            if self.stopped.is_some() {
                break;
            }
            if !iterations.is_empty()
                && self
                    .budget
                    .soft_deadline
                    .map_or(false, |soft| Instant::now() >= soft)
            {
                self.stopped = Some(StopReason::TimeLimit);
                break;
            }

            let Some(new_score) = self.aspiration_search(depth, score) else {
                break;
            };
            score = new_score;

            let pv = self.pv.line(0).to_vec();
            let best_move = pv
                .first()
                .copied()
                .or_else(|| iterations.last().and_then(|it| it.best_move));
            let info = IterationInfo {
                depth,
                seldepth: self.seldepth as u32,
                score,
                nodes: self.nodes,
                elapsed: self.elapsed(),
                pv,
                best_move,
            };
            log::debug!(
                "depth {} seldepth {} score {} nodes {} time {:?} pv {}",
                info.depth,
                info.seldepth,
                info.score,
                info.nodes,
                info.elapsed,
                format_pv(&info.pv)
            );
            on_iteration(&info);
            iterations.push(info);

            if self.budget.stop_on_mate && is_proven_mate(score, depth) {
                return (iterations, StopReason::MateFound);
            }
        }

        let reason = self.stopped.unwrap_or(StopReason::DepthReached);
        (iterations, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proven_mate() {
        assert!(is_proven_mate(MATE_SCORE - 1, 1));
        assert!(!is_proven_mate(MATE_SCORE - 3, 2));
        assert!(is_proven_mate(-MATE_SCORE + 2, 2));
        assert!(!is_proven_mate(500, 10));
    }

    #[test]
    fn test_format_pv() {
        let mut pos = crate::board::Position::new();
        let e4 = pos.parse_move("e2e4").unwrap();
        let nf3 = pos.parse_move("g1f3").unwrap();
        assert_eq!(format_pv(&[e4, nf3]), "e2e4 g1f3");
        assert_eq!(format_pv(&[]), "");
    }
}
