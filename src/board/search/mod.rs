//! Search module implementing alpha-beta with iterative deepening.
//!
//! Features:
//! - Iterative deepening with aspiration windows
//! - Negamax alpha-beta with a triangular PV table
//! - Null move pruning and mate distance pruning
//! - Quiescence search with stand-pat
//! - Move ordering (TT move, MVV-LVA, killers, history)
//! - Transposition table for move ordering and cutoffs
//! - Lazy SMP parallel search and a background search handle

mod alphabeta;
pub(crate) mod constants;
mod handle;
mod move_order;
mod params;
mod smp;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::{EngineOptions, OptionAction, OptionError};
use crate::tt::{Bound, TranspositionTable};

use super::{Evaluator, MaterialEvaluator, Move, Position};

pub use constants::{MATE_SCORE, MATE_THRESHOLD};
pub use handle::SearchHandle;
pub use move_order::{order_moves, HistoryTable, KillerTable};
pub use params::SearchParams;

/// Deepest iteration started when no depth limit is given
pub const MAX_SEARCH_DEPTH: u32 = 64;

/// Budget for one search. With no field set the search runs to
/// [`MAX_SEARCH_DEPTH`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_depth: Option<u32>,
    pub max_nodes: Option<u64>,
    pub time_budget: Option<Duration>,
    /// Ignore node and time budgets; run until stopped (or the depth cap)
    pub infinite: bool,
    /// Restrict the root to these moves (empty = all legal moves)
    pub search_moves: Vec<Move>,
}

impl SearchLimits {
    #[must_use]
    pub fn depth(depth: u32) -> Self {
        SearchLimits {
            max_depth: Some(depth),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn nodes(nodes: u64) -> Self {
        SearchLimits {
            max_nodes: Some(nodes),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn time(budget: Duration) -> Self {
        SearchLimits {
            time_budget: Some(budget),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn infinite() -> Self {
        SearchLimits {
            infinite: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.max_depth = Some(depth);
        self
    }

    #[must_use]
    pub fn with_nodes(mut self, nodes: u64) -> Self {
        self.max_nodes = Some(nodes);
        self
    }

    #[must_use]
    pub fn with_time(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    #[must_use]
    pub fn with_search_moves(mut self, moves: impl IntoIterator<Item = Move>) -> Self {
        self.search_moves = moves.into_iter().collect();
        self
    }
}

/// Score as a front-end displays it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32),
    /// Moves until mate; positive when the side to move mates, negative
    /// when it is mated, 0 when it is already checkmated.
    Mate(i32),
}

impl Score {
    #[must_use]
    pub fn from_internal(score: i32) -> Self {
        if score >= MATE_THRESHOLD {
            Score::Mate((MATE_SCORE - score + 1) / 2)
        } else if score <= -MATE_THRESHOLD {
            Score::Mate(-(MATE_SCORE + score + 1) / 2)
        } else {
            Score::Centipawns(score)
        }
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Score::Centipawns(cp) => write!(f, "cp {cp}"),
            Score::Mate(moves) => write!(f, "mate {moves}"),
        }
    }
}

/// Why the root has no legal move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Checkmate,
    Stalemate,
}

/// One completed iterative-deepening iteration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IterationInfo {
    pub depth: u32,
    pub seldepth: u32,
    pub score: i32,
    pub nodes: u64,
    pub elapsed: Duration,
    pub pv: Vec<Move>,
    pub best_move: Option<Move>,
}

impl IterationInfo {
    #[must_use]
    pub fn score_view(&self) -> Score {
        Score::from_internal(self.score)
    }
}

/// Callback invoked on the searching thread after every completed iteration.
pub type SearchInfoCallback = Arc<dyn Fn(&IterationInfo) + Send + Sync>;

/// Outcome of a search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResults {
    /// `None` only when the root has no legal move
    pub best_move: Option<Move>,
    pub ponder_move: Option<Move>,
    /// Side-to-move relative centipawns or mate encoding (see [`Score`])
    pub score: i32,
    /// Depth of the last completed iteration (0 if none completed)
    pub depth: u32,
    pub seldepth: u32,
    pub bound: Bound,
    pub outcome: Option<Outcome>,
    pub pv: Vec<Move>,
    /// Nodes searched by all workers
    pub nodes: u64,
    pub tt_hits: u64,
    pub elapsed: Duration,
    pub iterations: Vec<IterationInfo>,
}

impl SearchResults {
    #[must_use]
    pub fn score_view(&self) -> Score {
        Score::from_internal(self.score)
    }

    #[must_use]
    pub fn is_mate(&self) -> bool {
        matches!(self.score_view(), Score::Mate(_))
    }
}

/// Per-thread move ordering state.
#[derive(Clone, Debug, Default)]
pub(crate) struct SearchTables {
    pub(crate) killers: KillerTable,
    pub(crate) history: HistoryTable,
}

impl SearchTables {
    pub(crate) fn new_search(&mut self, decay_shift: u32) {
        self.killers.reset();
        self.history.decay(decay_shift);
    }
}

/// A search engine instance: options, the shared transposition table and
/// the main thread's ordering tables, kept across searches.
pub struct Searcher<E: Evaluator = MaterialEvaluator> {
    options: EngineOptions,
    tt: Arc<TranspositionTable>,
    evaluator: Arc<E>,
    tables: SearchTables,
    stop: Arc<AtomicBool>,
    latest: Arc<Mutex<Option<IterationInfo>>>,
    info_callback: Option<SearchInfoCallback>,
}

impl Searcher<MaterialEvaluator> {
    #[must_use]
    pub fn new(options: EngineOptions) -> Self {
        Searcher::with_evaluator(options, MaterialEvaluator)
    }
}

impl Default for Searcher<MaterialEvaluator> {
    fn default() -> Self {
        Searcher::new(EngineOptions::default())
    }
}

impl<E: Evaluator> Searcher<E> {
    #[must_use]
    pub fn with_evaluator(options: EngineOptions, evaluator: E) -> Self {
        super::init();
        Searcher {
            tt: Arc::new(TranspositionTable::new(options.hash_mb)),
            options,
            evaluator: Arc::new(evaluator),
            tables: SearchTables::default(),
            stop: Arc::new(AtomicBool::new(false)),
            latest: Arc::new(Mutex::new(None)),
            info_callback: None,
        }
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    #[must_use]
    pub fn params(&self) -> &SearchParams {
        &self.options.params
    }

    pub fn params_mut(&mut self) -> &mut SearchParams {
        &mut self.options.params
    }

    pub fn set_threads(&mut self, threads: usize) {
        self.options.threads = threads.max(1);
    }

    /// Apply a textual option (see [`EngineOptions::set_option`]),
    /// reallocating the transposition table when `Hash` changes.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), OptionError> {
        if let Some(OptionAction::ResizeHash(mb)) = self.options.set_option(name, value)? {
            self.resize_tt(mb);
        }
        Ok(())
    }

    fn resize_tt(&mut self, size_mb: usize) {
        match Arc::get_mut(&mut self.tt) {
            Some(tt) => tt.resize(size_mb),
            None => self.tt = Arc::new(TranspositionTable::new(size_mb)),
        }
    }

    #[must_use]
    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        self.tt.hashfull_per_mille()
    }

    /// Forget everything learned: transposition table, killers and history.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.tables = SearchTables::default();
        *self.latest.lock() = None;
    }

    pub fn set_info_callback(&mut self, callback: Option<SearchInfoCallback>) {
        self.info_callback = callback;
    }

    /// Flag that aborts the running search when set. It is cleared at the
    /// start of every [`Searcher::search`].
    #[must_use]
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Ask the running search to stop.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Last iteration completed by the current or previous search.
    #[must_use]
    pub fn latest(&self) -> Option<IterationInfo> {
        self.latest.lock().clone()
    }

    /// Search `pos` within `limits`. The position itself is not modified.
    pub fn search(&mut self, pos: &Position, limits: &SearchLimits) -> SearchResults {
        self.stop.store(false, Ordering::Relaxed);
        self.run(pos, limits)
    }

    /// Search without clearing the stop flag first.
    pub(crate) fn run(&mut self, pos: &Position, limits: &SearchLimits) -> SearchResults {
        self.tt.new_search();
        self.tables.new_search(self.options.params.history_decay_shift);
        *self.latest.lock() = None;

        let shared = smp::SharedSearch {
            tt: &self.tt,
            evaluator: self.evaluator.as_ref(),
            params: &self.options.params,
            stop: &self.stop,
            latest: &self.latest,
            info_callback: self.info_callback.as_ref(),
        };
        smp::run_search(&shared, &mut self.tables, pos, limits, self.options.threads)
    }
}

impl<E: Evaluator + 'static> Searcher<E> {
    /// Run the search on a dedicated thread.
    pub fn spawn(self, pos: Position, limits: SearchLimits) -> std::io::Result<SearchHandle<E>> {
        SearchHandle::spawn(self, pos, limits)
    }
}

impl<E: Evaluator> std::fmt::Debug for Searcher<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher")
            .field("options", &self.options)
            .field("tt", &self.tt)
            .finish_non_exhaustive()
    }
}

/// One-shot search with default options and a fresh transposition table.
#[must_use]
pub fn search(pos: &Position, limits: &SearchLimits) -> SearchResults {
    Searcher::default().search(pos, limits)
}
