//! Core search implementation.
//!
//! This module implements:
//! - Iterative deepening with aspiration windows
//! - Alpha-beta search with PVS
//! - Check extension
//! - Null move pruning
//! - Mate distance pruning
//! - Quiescence search
//! - Draw detection (repetition, fifty-move rule, insufficient material)

mod iterative;
mod pruning;
mod quiescence;

pub(crate) use iterative::StopReason;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::constants::{DRAW_SCORE, INFINITY, MATE_SCORE, MATE_THRESHOLD};
use super::move_order::order_moves;
use super::{SearchLimits, SearchParams, SearchTables, MAX_SEARCH_DEPTH};
use crate::board::{Evaluator, Move, MoveList, Position, EMPTY_MOVE, MAX_PLY};
use crate::tt::{score_to_tt, Bound, TranspositionTable};

/// Resolved budget for one search, shared by all workers.
#[derive(Clone, Debug)]
pub(crate) struct Budget {
    pub(crate) start: Instant,
    /// Hard deadline: running iterations are abandoned
    pub(crate) deadline: Option<Instant>,
    /// No new iteration starts after this
    pub(crate) soft_deadline: Option<Instant>,
    pub(crate) max_nodes: Option<u64>,
    pub(crate) max_depth: u32,
    pub(crate) stop_on_mate: bool,
}

impl Budget {
    pub(crate) fn new(limits: &SearchLimits, start: Instant) -> Self {
        let max_depth = limits
            .max_depth
            .unwrap_or(MAX_SEARCH_DEPTH)
            .clamp(1, (MAX_PLY - 1) as u32);
        if limits.infinite {
            return Budget {
                start,
                deadline: None,
                soft_deadline: None,
                max_nodes: None,
                max_depth,
                stop_on_mate: false,
            };
        }
        Budget {
            start,
            deadline: limits.time_budget.map(|budget| start + budget),
            soft_deadline: limits.time_budget.map(|budget| start + budget / 2),
            max_nodes: limits.max_nodes,
            max_depth,
            stop_on_mate: true,
        }
    }
}

/// Triangular principal-variation table.
struct PvTable {
    moves: Box<[[Move; MAX_PLY]; MAX_PLY]>,
    len: [usize; MAX_PLY],
}

impl PvTable {
    fn new() -> Self {
        PvTable {
            moves: Box::new([[EMPTY_MOVE; MAX_PLY]; MAX_PLY]),
            len: [0; MAX_PLY],
        }
    }

    #[inline]
    fn clear(&mut self, ply: usize) {
        if ply < MAX_PLY {
            self.len[ply] = 0;
        }
    }

    /// `mv` followed by the line just found at `ply + 1`.
    fn update(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_PLY {
            return;
        }
        let child_len = if ply + 1 < MAX_PLY {
            self.len[ply + 1].min(MAX_PLY - 1)
        } else {
            0
        };
        let (head, tail) = self.moves.split_at_mut(ply + 1);
        let row = &mut head[ply];
        row[0] = mv;
        if child_len > 0 {
            row[1..=child_len].copy_from_slice(&tail[0][..child_len]);
        }
        self.len[ply] = child_len + 1;
    }

    fn line(&self, ply: usize) -> &[Move] {
        &self.moves[ply][..self.len[ply]]
    }
}

/// State of one worker's search over its own copy of the position.
pub(crate) struct SearchContext<'a, E: Evaluator + ?Sized> {
    pos: Position,
    tt: &'a TranspositionTable,
    evaluator: &'a E,
    params: &'a SearchParams,
    tables: &'a mut SearchTables,
    stop: &'a AtomicBool,
    /// Set by the main worker when it finishes; only helpers watch it.
    abort: Option<&'a AtomicBool>,
    budget: &'a Budget,
    root_moves: MoveList,
    /// History length at the root: repetitions at or above it are on the search path
    search_root: usize,
    pv: PvTable,
    check_interval: u64,
    pub(crate) nodes: u64,
    pub(crate) tt_hits: u64,
    seldepth: usize,
    stopped: Option<StopReason>,
}

impl<'a, E: Evaluator + ?Sized> SearchContext<'a, E> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        pos: Position,
        root_moves: MoveList,
        tt: &'a TranspositionTable,
        evaluator: &'a E,
        params: &'a SearchParams,
        tables: &'a mut SearchTables,
        stop: &'a AtomicBool,
        abort: Option<&'a AtomicBool>,
        budget: &'a Budget,
    ) -> Self {
        let search_root = pos.history_len();
        SearchContext {
            pos,
            tt,
            evaluator,
            params,
            tables,
            stop,
            abort,
            budget,
            root_moves,
            search_root,
            pv: PvTable::new(),
            check_interval: params.check_interval.max(1),
            nodes: 0,
            tt_hits: 0,
            seldepth: 0,
            stopped: None,
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.budget.start.elapsed()
    }

    fn poll_signals(&mut self) {
        if self.stop.load(Ordering::Relaxed)
            || self.abort.map_or(false, |flag| flag.load(Ordering::Relaxed))
        {
            self.stopped = Some(StopReason::Stopped);
        } else if self.budget.deadline.map_or(false, |d| Instant::now() >= d) {
            self.stopped = Some(StopReason::TimeLimit);
        }
    }

    /// Latching stop test. The node budget is exact; the stop flag and the
    /// clock are polled every `check_interval` nodes.
    #[inline]
    fn should_stop(&mut self) -> bool {
        if self.stopped.is_some() {
            return true;
        }
        if self.budget.max_nodes.map_or(false, |max| self.nodes >= max) {
            self.stopped = Some(StopReason::NodeLimit);
            return true;
        }
        if self.nodes % self.check_interval == 0 {
            self.poll_signals();
        }
        self.stopped.is_some()
    }

    /// Count a node at `ply`, or return false if the search must unwind.
    #[inline]
    fn enter_node(&mut self, ply: usize) -> bool {
        if self.should_stop() {
            return false;
        }
        self.nodes += 1;
        self.seldepth = self.seldepth.max(ply + 1);
        true
    }

    /// Static evaluation, kept clear of the mate score range.
    #[inline]
    fn evaluate(&self) -> i32 {
        self.evaluator
            .evaluate(&self.pos)
            .clamp(-MATE_THRESHOLD + 1, MATE_THRESHOLD - 1)
    }

    /// A checkmate delivered on the hundredth half-move still wins, so the
    /// fifty-move count only draws when the side to move is not mated.
    fn is_draw(&mut self) -> bool {
        if self.pos.is_repetition(self.search_root) || self.pos.is_insufficient_material() {
            return true;
        }
        self.pos.is_fifty_move_draw() && !self.pos.is_checkmate()
    }

    fn record_cutoff(&mut self, mv: Move, depth: u32, ply: usize, quiets_tried: &MoveList) {
        if !mv.is_quiet() {
            return;
        }
        self.tables.killers.update(ply, mv);
        self.tables.history.update(mv, depth);
        for &quiet in quiets_tried {
            self.tables.history.penalize(quiet, depth);
        }
    }

    /// Negamax alpha-beta. Returns a score from the side to move's view,
    /// relative to the root for mate scores. After a stop the return value
    /// is meaningless and every make has been unmade.
    pub(crate) fn alphabeta(
        &mut self,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        ply: usize,
        allow_null: bool,
    ) -> i32 {
        self.pv.clear(ply);
        let is_root = ply == 0;
        let is_pv = beta > alpha + 1;

        if !is_root {
            if self.is_draw() {
                return DRAW_SCORE;
            }
            if ply >= MAX_PLY - 1 {
                return self.evaluate();
            }
            if let Some(score) = Self::mate_distance_prune(&mut alpha, &mut beta, ply) {
                return score;
            }
        }

        let in_check = self.pos.is_in_check(self.pos.side_to_move());
        let depth = if in_check { depth + 1 } else { depth };
        if depth == 0 {
            return self.quiesce(alpha, beta, ply, 0);
        }

        if !self.enter_node(ply) {
            return 0;
        }

        let hash = self.pos.hash();
        let mut tt_move = None;
        if let Some(entry) = self.tt.probe(hash) {
            self.tt_hits += 1;
            tt_move = entry.best_move();
            if !is_pv && !is_root {
                if let Some(score) = entry.cutoff(depth, alpha, beta, ply) {
                    return score;
                }
            }
        }

        if !is_pv && !is_root && !in_check && allow_null {
            if let Some(score) = self.try_null_move(depth, beta, ply) {
                return score;
            }
            if self.stopped.is_some() {
                return 0;
            }
        }

        let moves = if is_root {
            self.root_moves.clone()
        } else {
            self.pos.generate_moves()
        };
        if moves.is_empty() {
            return if in_check {
                -MATE_SCORE + ply as i32
            } else {
                DRAW_SCORE
            };
        }

        let ordered = order_moves(
            &moves,
            &self.pos,
            tt_move,
            &self.tables.killers,
            &self.tables.history,
            ply,
        );

        let original_alpha = alpha;
        let mut best_score = -INFINITY;
        let mut best_move = None;
        let mut quiets_tried = MoveList::new();

        for (i, scored) in ordered.iter().enumerate() {
            let mv = scored.mv;
            let info = self.pos.make_move(mv);
            let score = if i == 0 {
                -self.alphabeta(depth - 1, -beta, -alpha, ply + 1, true)
            } else {
                let probe = -self.alphabeta(depth - 1, -alpha - 1, -alpha, ply + 1, true);
                if probe > alpha && probe < beta {
                    -self.alphabeta(depth - 1, -beta, -alpha, ply + 1, true)
                } else {
                    probe
                }
            };
            self.pos.unmake_move(mv, info);

            if self.stopped.is_some() {
                return 0;
            }

            if score > best_score {
                best_score = score;
                if score > alpha {
                    alpha = score;
                    best_move = Some(mv);
                    self.pv.update(ply, mv);
                    if score >= beta {
                        self.record_cutoff(mv, depth, ply, &quiets_tried);
                        break;
                    }
                }
            }
            if mv.is_quiet() {
                quiets_tried.push(mv);
            }
        }

        let bound = if best_score >= beta {
            Bound::Lower
        } else if best_score > original_alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.tt
            .store(hash, depth, score_to_tt(best_score, ply), bound, best_move);
        best_score
    }
}
