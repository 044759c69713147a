//! Lazy SMP (Symmetric `MultiProcessing`) parallel search.
//!
//! Every worker runs its own iterative deepening over its own copy of the
//! position, with its own killer and history tables. Workers share only the
//! transposition table (and the stop flag), which provides the coordination.
//! The main worker's result is authoritative; when it finishes, the helpers
//! are told to stop.
//!
//! Helper threads alternate between the main worker's depth schedule and one
//! starting (and ending) a ply deeper, so they tend to fill the table ahead
//! of the main worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use parking_lot::Mutex;

use super::alphabeta::{Budget, SearchContext, StopReason};
use super::constants::{DRAW_SCORE, MATE_SCORE, MATE_THRESHOLD};
use super::move_order::order_moves;
use super::{
    IterationInfo, Outcome, SearchInfoCallback, SearchLimits, SearchParams, SearchResults,
    SearchTables,
};
use crate::board::{Evaluator, Move, MoveList, Position, MAX_PLY};
use crate::tt::{Bound, TranspositionTable};

/// Search thread stack size (32 MB to handle deep recursion)
const SEARCH_STACK_SIZE: usize = 32 * 1024 * 1024;

/// What every worker of one search shares.
pub(crate) struct SharedSearch<'a, E: Evaluator + ?Sized> {
    pub(crate) tt: &'a TranspositionTable,
    pub(crate) evaluator: &'a E,
    pub(crate) params: &'a SearchParams,
    pub(crate) stop: &'a AtomicBool,
    pub(crate) latest: &'a Mutex<Option<IterationInfo>>,
    pub(crate) info_callback: Option<&'a SearchInfoCallback>,
}

struct WorkerReport {
    iterations: Vec<IterationInfo>,
    reason: StopReason,
    nodes: u64,
    tt_hits: u64,
}

/// Depth schedule for worker `id` (0 is the main worker).
fn worker_depths(id: usize, max_depth: u32) -> (u32, u32) {
    let offset = (id % 2) as u32;
    let last = (max_depth + offset).min((MAX_PLY - 1) as u32);
    ((1 + offset).min(last), last)
}

/// Root moves after applying the `search_moves` restriction. An empty or
/// entirely illegal restriction leaves every legal move.
fn root_moves(legal: &MoveList, search_moves: &[Move]) -> MoveList {
    if search_moves.is_empty() {
        return legal.clone();
    }
    let mut moves = legal.clone();
    moves.retain(|mv| search_moves.contains(&mv));
    if moves.is_empty() {
        log::warn!("none of the requested search moves is legal; searching all moves");
        return legal.clone();
    }
    moves
}

fn run_worker<E: Evaluator + ?Sized>(
    id: usize,
    shared: &SharedSearch<'_, E>,
    tables: &mut SearchTables,
    pos: Position,
    moves: MoveList,
    budget: &Budget,
    abort: Option<&AtomicBool>,
) -> WorkerReport {
    log::trace!("search worker {id} starting");
    let (first, last) = worker_depths(id, budget.max_depth);
    let mut ctx = SearchContext::new(
        pos,
        moves,
        shared.tt,
        shared.evaluator,
        shared.params,
        tables,
        shared.stop,
        abort,
        budget,
    );

    let mut report_iteration = |info: &IterationInfo| {
        if id != 0 {
            return;
        }
        *shared.latest.lock() = Some(info.clone());
        if let Some(callback) = shared.info_callback {
            callback(info);
        }
    };
    let (iterations, reason) = ctx.iterative_deepening(first, last, &mut report_iteration);
    log::trace!(
        "search worker {id} finished: {} iterations, {} nodes, {reason:?}",
        iterations.len(),
        ctx.nodes
    );
    WorkerReport {
        iterations,
        reason,
        nodes: ctx.nodes,
        tt_hits: ctx.tt_hits,
    }
}

/// Result for a root with no legal move.
fn no_move_results(in_check: bool, start: Instant) -> SearchResults {
    let (score, outcome) = if in_check {
        (-MATE_SCORE, Outcome::Checkmate)
    } else {
        (DRAW_SCORE, Outcome::Stalemate)
    };
    SearchResults {
        best_move: None,
        ponder_move: None,
        score,
        depth: 0,
        seldepth: 0,
        bound: Bound::Exact,
        outcome: Some(outcome),
        pv: Vec::new(),
        nodes: 0,
        tt_hits: 0,
        elapsed: start.elapsed(),
        iterations: Vec::new(),
    }
}

/// First root move in search order, used when no iteration completed.
fn fallback_move(pos: &Position, moves: &MoveList, tt: &TranspositionTable, tables: &SearchTables) -> Option<Move> {
    let tt_move = tt
        .probe(pos.hash())
        .and_then(|entry| entry.best_move())
        .filter(|mv| moves.contains(*mv));
    order_moves(moves, pos, tt_move, &tables.killers, &tables.history, 0)
        .iter()
        .next()
        .map(|scored| scored.mv)
}

pub(crate) fn run_search<E: Evaluator + ?Sized>(
    shared: &SharedSearch<'_, E>,
    tables: &mut SearchTables,
    pos: &Position,
    limits: &SearchLimits,
    threads: usize,
) -> SearchResults {
    let start = Instant::now();
    let budget = Budget::new(limits, start);
    let mut root = pos.clone();

    let legal = root.generate_moves();
    if legal.is_empty() {
        let in_check = root.is_in_check(root.side_to_move());
        let results = no_move_results(in_check, start);
        log::debug!("search finished: no legal move ({:?})", results.outcome);
        return results;
    }
    let moves = root_moves(&legal, &limits.search_moves);

    if root.is_draw() {
        let best_move = fallback_move(&root, &moves, shared.tt, tables);
        log::debug!("search finished: root position is already drawn");
        return SearchResults {
            best_move,
            ponder_move: None,
            score: DRAW_SCORE,
            depth: 0,
            seldepth: 0,
            bound: Bound::Exact,
            outcome: None,
            pv: best_move.into_iter().collect(),
            nodes: 0,
            tt_hits: 0,
            elapsed: start.elapsed(),
            iterations: Vec::new(),
        };
    }

    let helpers_done = AtomicBool::new(false);
    let (main, helper_nodes, helper_hits) = thread::scope(|scope| {
        let mut helpers = Vec::with_capacity(threads.saturating_sub(1));
        for id in 1..threads.max(1) {
            let worker_pos = root.clone();
            let worker_moves = moves.clone();
            let budget = &budget;
            let helpers_done = &helpers_done;
            let spawned = thread::Builder::new()
                .name(format!("search-{id}"))
                .stack_size(SEARCH_STACK_SIZE)
                .spawn_scoped(scope, move || {
                    let mut local = SearchTables::default();
                    run_worker(
                        id,
                        shared,
                        &mut local,
                        worker_pos,
                        worker_moves,
                        budget,
                        Some(helpers_done),
                    )
                });
            match spawned {
                Ok(handle) => helpers.push(handle),
                Err(err) => {
                    log::warn!("could not spawn search worker {id}: {err}");
                    break;
                }
            }
        }

        let main = run_worker(0, shared, tables, root.clone(), moves.clone(), &budget, None);
        helpers_done.store(true, Ordering::Relaxed);

        let mut nodes = 0;
        let mut hits = 0;
        for handle in helpers {
            if let Ok(report) = handle.join() {
                nodes += report.nodes;
                hits += report.tt_hits;
            }
        }
        (main, nodes, hits)
    });

    let nodes = main.nodes + helper_nodes;
    let tt_hits = main.tt_hits + helper_hits;
    let elapsed = start.elapsed();

    let results = match main.iterations.last() {
        Some(last) => SearchResults {
            best_move: last.best_move,
            ponder_move: last.pv.get(1).copied(),
            score: last.score,
            depth: last.depth,
            seldepth: last.seldepth,
            bound: Bound::Exact,
            outcome: None,
            pv: last.pv.clone(),
            nodes,
            tt_hits,
            elapsed,
            iterations: main.iterations.clone(),
        },
        None => {
            let best_move = fallback_move(&root, &moves, shared.tt, tables);
            let score = shared
                .evaluator
                .evaluate(&root)
                .clamp(-MATE_THRESHOLD + 1, MATE_THRESHOLD - 1);
            SearchResults {
                best_move,
                ponder_move: None,
                score,
                depth: 0,
                seldepth: 0,
                bound: Bound::Exact,
                outcome: None,
                pv: best_move.into_iter().collect(),
                nodes,
                tt_hits,
                elapsed,
                iterations: Vec::new(),
            }
        }
    };

    log::debug!(
        "search finished ({:?}): depth {} score {} nodes {} time {:?} best {}",
        main.reason,
        results.depth,
        results.score,
        results.nodes,
        results.elapsed,
        results
            .best_move
            .map_or_else(|| "(none)".to_string(), |mv| mv.to_string())
    );
    results
}
