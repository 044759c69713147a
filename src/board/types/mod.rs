//! Core chess types.
//!
//! - `Piece` and `Color` - piece types and sides
//! - `Square` - compact board square (0-63)
//! - `Bitboard` - 64-bit square set
//! - `Move`, `MoveList`, `ScoredMoveList` - packed moves and fixed-capacity lists
//! - `CastlingRights` - 4-bit castling state

mod bitboard;
mod castling;
mod moves;
mod piece;
mod square;

pub use bitboard::{Bitboard, BitboardIter};
pub use castling::CastlingRights;
pub use moves::{Move, MoveList, MoveListIntoIter, ScoredMove, ScoredMoveList, MAX_MOVES, MAX_PLY};
pub use piece::{Color, Piece};
pub use square::Square;

pub(crate) use castling::castle_rook_squares;
pub(crate) use moves::EMPTY_MOVE;
pub(crate) use piece::PROMOTION_PIECES;
