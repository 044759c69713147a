//! A bitboard chess engine core: position, legal move generation, Zobrist
//! hashing, a lockless transposition table and an iterative-deepening
//! alpha-beta search with optional Lazy SMP.
//!
//! ```
//! use alphadeep::{search, Position, SearchLimits};
//!
//! let pos = Position::new();
//! let results = search(&pos, &SearchLimits::depth(3));
//! assert!(results.best_move.is_some());
//! ```

pub mod board;
pub mod config;
pub mod tt;
pub mod zobrist;

pub use board::{
    search, Bitboard, Color, Evaluator, FenError, IterationInfo, MaterialEvaluator, Move,
    MoveParseError, Outcome, Piece, Position, Score, SearchHandle, SearchInfoCallback, SearchLimits,
    SearchParams, SearchResults, Searcher, Square,
};
pub use config::{EngineOptions, OptionError};
pub use tt::{Bound, TranspositionTable};
