use std::str::FromStr;

use super::error::{FenError, MoveParseError};
use super::{CastlingRights, Color, Move, Piece, Position, Square};
use crate::zobrist;

impl Position {
    /// Parse a position from FEN notation.
    ///
    /// The halfmove clock and fullmove number are optional and default to
    /// 0 and 1.
    pub fn try_from_fen(fen: &str) -> Result<Self, FenError> {
        let mut pos = Position::empty();
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() < 4 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }

        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidRank { rank: ranks.len() });
        }
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx;
            let mut file = 0;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    if file > 8 {
                        return Err(FenError::TooManyFiles {
                            rank: rank_idx,
                            files: file,
                        });
                    }
                    continue;
                }
                let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                let color = if c.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                let sq = Square::new(rank, file).ok_or(FenError::TooManyFiles {
                    rank: rank_idx,
                    files: file + 1,
                })?;
                pos.set_piece(sq, color, piece);
                file += 1;
            }
            if file < 8 {
                return Err(FenError::TooFewFiles {
                    rank: rank_idx,
                    files: file,
                });
            }
        }

        for color in Color::BOTH {
            if pos.pieces(color, Piece::King).popcount() != 1 {
                return Err(FenError::MissingKing { color });
            }
        }

        pos.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        let waiting = pos.side_to_move.opponent();
        if pos.is_in_check(waiting) {
            return Err(FenError::OpponentInCheck { color: waiting });
        }

        let mut castling = CastlingRights::none();
        for c in parts[2].chars() {
            match c {
                'K' => castling.set(Color::White, true),
                'Q' => castling.set(Color::White, false),
                'k' => castling.set(Color::Black, true),
                'q' => castling.set(Color::Black, false),
                '-' => {}
                _ => return Err(FenError::InvalidCastling { char: c }),
            }
        }
        pos.castling = castling;

        pos.en_passant = if parts[3] == "-" {
            None
        } else {
            let sq: Square = parts[3].parse().map_err(|_| FenError::InvalidEnPassant {
                found: parts[3].to_string(),
            })?;
            if sq.rank() != 2 && sq.rank() != 5 {
                return Err(FenError::InvalidEnPassant {
                    found: parts[3].to_string(),
                });
            }
            pos.capturable_en_passant(sq, pos.side_to_move)
        };

        let parse_clock = |field: &str| {
            field.parse::<u32>().map_err(|_| FenError::InvalidClock {
                found: field.to_string(),
            })
        };
        if let Some(field) = parts.get(4) {
            pos.halfmove_clock = parse_clock(field)?;
        }
        if let Some(field) = parts.get(5) {
            pos.fullmove_number = parse_clock(field)?.max(1);
        }

        pos.hash = zobrist::full_hash(&pos);
        Ok(pos)
    }

    /// Parse a position from FEN notation.
    ///
    /// # Panics
    /// Panics if the FEN string is invalid. Use `try_from_fen` for fallible parsing.
    #[must_use]
    pub fn from_fen(fen: &str) -> Self {
        match Self::try_from_fen(fen) {
            Ok(pos) => pos,
            Err(err) => panic!("invalid FEN '{fen}': {err}"),
        }
    }

    /// Serialise the position to FEN notation.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut rows: Vec<String> = Vec::with_capacity(8);
        for rank in (0..8).rev() {
            let mut row = String::new();
            let mut empty = 0;
            for file in 0..8 {
                match Square::new(rank, file).and_then(|sq| self.piece_at(sq)) {
                    Some((color, piece)) => {
                        if empty > 0 {
                            row.push_str(&empty.to_string());
                            empty = 0;
                        }
                        row.push(piece.to_fen_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            rows.push(row);
        }

        let active = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };
        let ep = self
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());

        format!(
            "{} {} {} {} {} {}",
            rows.join("/"),
            active,
            self.castling,
            ep,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Parse a move in long algebraic notation (e.g. "e2e4", "e7e8q").
    ///
    /// Returns the matching legal move if found, or an error describing why
    /// parsing failed.
    ///
    /// # Example
    /// ```
    /// use alphadeep::board::Position;
    ///
    /// let mut pos = Position::new();
    /// let mv = pos.parse_move("e2e4").unwrap();
    /// assert_eq!(mv.to_string(), "e2e4");
    /// ```
    pub fn parse_move(&mut self, text: &str) -> Result<Move, MoveParseError> {
        if !text.is_ascii() || text.len() < 4 || text.len() > 5 {
            return Err(MoveParseError::InvalidLength {
                len: text.chars().count(),
            });
        }

        let invalid_square = || MoveParseError::InvalidSquare {
            notation: text.to_string(),
        };
        let from: Square = text[0..2].parse().map_err(|_| invalid_square())?;
        let to: Square = text[2..4].parse().map_err(|_| invalid_square())?;

        let promotion = match text[4..].chars().next() {
            Some(c) => match Piece::from_char(c) {
                Some(piece) if !matches!(piece, Piece::Pawn | Piece::King) => Some(piece),
                _ => return Err(MoveParseError::InvalidPromotion { char: c }),
            },
            None => None,
        };

        self.generate_moves()
            .into_iter()
            .find(|mv| mv.from() == from && mv.to() == to && mv.promotion() == promotion)
            .ok_or_else(|| MoveParseError::IllegalMove {
                notation: text.to_string(),
            })
    }

    /// Parse a long algebraic move and play it.
    ///
    /// # Example
    /// ```
    /// use alphadeep::board::Position;
    ///
    /// let mut pos = Position::new();
    /// pos.make_move_str("e2e4").unwrap();
    /// pos.make_move_str("e7e5").unwrap();
    /// ```
    pub fn make_move_str(&mut self, text: &str) -> Result<Move, MoveParseError> {
        let mv = self.parse_move(text)?;
        self.make_move(mv);
        Ok(mv)
    }

    /// Replay a sequence of long algebraic moves. Stops at the first move
    /// that fails to parse, leaving the earlier moves applied.
    pub fn apply_moves<S: AsRef<str>>(&mut self, moves: &[S]) -> Result<(), MoveParseError> {
        for text in moves {
            self.make_move_str(text.as_ref())?;
        }
        Ok(())
    }
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::try_from_fen(s)
    }
}
