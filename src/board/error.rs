//! Error types for position setup and move parsing.

use std::fmt;

/// Error type for FEN parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// FEN string has too few fields (needs at least 4)
    TooFewParts { found: usize },
    /// Placement field does not describe exactly eight ranks
    InvalidRank { rank: usize },
    /// Invalid piece character in placement field
    InvalidPiece { char: char },
    /// Too many files in a rank
    TooManyFiles { rank: usize, files: usize },
    /// Too few files in a rank
    TooFewFiles { rank: usize, files: usize },
    /// Invalid side to move (must be 'w' or 'b')
    InvalidSideToMove { found: String },
    /// Invalid castling character
    InvalidCastling { char: char },
    /// Invalid en passant square
    InvalidEnPassant { found: String },
    /// Halfmove clock or fullmove number is not a number
    InvalidClock { found: String },
    /// A side has no king (or more than one)
    MissingKing { color: super::Color },
    /// The side not to move is in check, so its king could be captured
    OpponentInCheck { color: super::Color },
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::TooFewParts { found } => {
                write!(f, "FEN must have at least 4 parts, found {found}")
            }
            FenError::InvalidRank { rank } => {
                write!(f, "Invalid rank index {rank} in FEN")
            }
            FenError::InvalidPiece { char } => {
                write!(f, "Invalid piece character '{char}' in FEN")
            }
            FenError::TooManyFiles { rank, files } => {
                write!(f, "Too many files ({files}) in rank {rank}")
            }
            FenError::TooFewFiles { rank, files } => {
                write!(f, "Too few files ({files}) in rank {rank}")
            }
            FenError::InvalidSideToMove { found } => {
                write!(f, "Invalid side to move '{found}', expected 'w' or 'b'")
            }
            FenError::InvalidCastling { char } => {
                write!(f, "Invalid castling character '{char}' in FEN")
            }
            FenError::InvalidEnPassant { found } => {
                write!(f, "Invalid en passant square '{found}'")
            }
            FenError::InvalidClock { found } => {
                write!(f, "Invalid move counter '{found}'")
            }
            FenError::MissingKing { color } => {
                write!(f, "{color} must have exactly one king")
            }
            FenError::OpponentInCheck { color } => {
                write!(f, "{color} is in check but not on move")
            }
        }
    }
}

impl std::error::Error for FenError {}

/// Error type for move parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    /// Move string has invalid length (must be 4-5 characters)
    InvalidLength { len: usize },
    /// Invalid square notation in move
    InvalidSquare { notation: String },
    /// Invalid promotion piece
    InvalidPromotion { char: char },
    /// Move is not legal in the current position
    IllegalMove { notation: String },
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::InvalidLength { len } => {
                write!(f, "Move must be 4-5 characters, found {len}")
            }
            MoveParseError::InvalidSquare { notation } => {
                write!(f, "Invalid square notation in '{notation}'")
            }
            MoveParseError::InvalidPromotion { char } => {
                write!(f, "Invalid promotion piece '{char}'")
            }
            MoveParseError::IllegalMove { notation } => {
                write!(f, "Illegal move '{notation}'")
            }
        }
    }
}

impl std::error::Error for MoveParseError {}

/// Error type for square parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SquareError {
    /// Rank out of bounds (must be 0-7)
    RankOutOfBounds { rank: usize },
    /// File out of bounds (must be 0-7)
    FileOutOfBounds { file: usize },
    /// Invalid algebraic notation
    InvalidNotation { notation: String },
}

impl fmt::Display for SquareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquareError::RankOutOfBounds { rank } => {
                write!(f, "Rank {rank} out of bounds (must be 0-7)")
            }
            SquareError::FileOutOfBounds { file } => {
                write!(f, "File {file} out of bounds (must be 0-7)")
            }
            SquareError::InvalidNotation { notation } => {
                write!(f, "Invalid square notation '{notation}'")
            }
        }
    }
}

impl std::error::Error for SquareError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Color;

    #[test]
    fn test_fen_error_too_few_parts() {
        let err = FenError::TooFewParts { found: 2 };
        assert!(err.to_string().contains('2'));
        assert!(err.to_string().contains('4'));
    }

    #[test]
    fn test_fen_error_invalid_piece() {
        let err = FenError::InvalidPiece { char: 'z' };
        assert!(err.to_string().contains("'z'"));
    }

    #[test]
    fn test_fen_error_short_rank() {
        let err = FenError::TooFewFiles { rank: 3, files: 7 };
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn test_fen_error_missing_king() {
        let err = FenError::MissingKing {
            color: Color::Black,
        };
        assert!(err.to_string().contains("Black"));
    }

    #[test]
    fn test_fen_error_opponent_in_check() {
        let err = FenError::OpponentInCheck {
            color: Color::White,
        };
        assert!(err.to_string().contains("White"));
        assert!(err.to_string().contains("check"));
    }

    #[test]
    fn test_fen_error_invalid_clock() {
        let err = FenError::InvalidClock {
            found: "x1".to_string(),
        };
        assert!(err.to_string().contains("'x1'"));
    }

    #[test]
    fn test_move_error_invalid_length() {
        let err = MoveParseError::InvalidLength { len: 3 };
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn test_move_error_illegal_move() {
        let err = MoveParseError::IllegalMove {
            notation: "e2e5".to_string(),
        };
        assert!(err.to_string().contains("e2e5"));
    }

    #[test]
    fn test_square_error_invalid_notation() {
        let err = SquareError::InvalidNotation {
            notation: "xyz".to_string(),
        };
        assert!(err.to_string().contains("xyz"));
    }
}
