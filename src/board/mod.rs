//! Chess board representation and game logic.
//!
//! Uses bitboards for move generation and evaluation. Supports the full
//! rules including castling, en passant and promotions.
//!
//! # Example
//! ```
//! use alphadeep::board::Position;
//!
//! let mut pos = Position::new();
//! let moves = pos.generate_moves();
//! assert_eq!(moves.len(), 20);
//! ```

mod attack_tables;
mod error;
mod eval;
mod fen;
mod make_unmake;
mod movegen;
mod perft;
mod pst;
pub mod search;
mod state;
mod types;

#[cfg(test)]
mod tests;

pub use attack_tables::init;
pub use error::{FenError, MoveParseError, SquareError};
pub use eval::{Evaluator, MaterialEvaluator};
pub use state::{NullMoveInfo, Position, UnmakeInfo};
pub use types::{
    Bitboard, BitboardIter, CastlingRights, Color, Move, MoveList, MoveListIntoIter, Piece,
    ScoredMove, ScoredMoveList, Square, MAX_MOVES, MAX_PLY,
};

pub use search::{
    search, IterationInfo, Outcome, Score, SearchHandle, SearchInfoCallback, SearchLimits,
    SearchParams, SearchResults, Searcher,
};

pub(crate) use types::{castle_rook_squares, EMPTY_MOVE, PROMOTION_PIECES};
