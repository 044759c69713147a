//! Castling rights type.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::piece::Color;
use super::square::Square;

const CASTLE_WHITE_K: u8 = 1 << 0;
const CASTLE_WHITE_Q: u8 = 1 << 1;
const CASTLE_BLACK_K: u8 = 1 << 2;
const CASTLE_BLACK_Q: u8 = 1 << 3;

const ALL_CASTLING_RIGHTS: u8 = CASTLE_WHITE_K | CASTLE_WHITE_Q | CASTLE_BLACK_K | CASTLE_BLACK_Q;

/// Rights lost when a piece moves from, or is captured on, each square.
const fn rights_mask_for(idx: usize) -> u8 {
    match idx {
        0 => CASTLE_WHITE_Q,
        4 => CASTLE_WHITE_K | CASTLE_WHITE_Q,
        7 => CASTLE_WHITE_K,
        56 => CASTLE_BLACK_Q,
        60 => CASTLE_BLACK_K | CASTLE_BLACK_Q,
        63 => CASTLE_BLACK_K,
        _ => 0,
    }
}

/// Rook origin and destination for a castling king landing on `king_to`.
#[inline]
#[must_use]
pub(crate) const fn castle_rook_squares(king_to: Square) -> (Square, Square) {
    let base = king_to.index() & 56;
    if king_to.file() == 6 {
        (Square::from_index(base + 7), Square::from_index(base + 5))
    } else {
        (Square::from_index(base), Square::from_index(base + 3))
    }
}

/// Castling rights as a 4-bit mask (K, Q, k, q).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CastlingRights(u8);

impl CastlingRights {
    #[must_use]
    pub const fn none() -> Self {
        CastlingRights(0)
    }

    #[must_use]
    pub const fn all() -> Self {
        CastlingRights(ALL_CASTLING_RIGHTS)
    }

    #[inline]
    #[must_use]
    pub const fn has(self, color: Color, kingside: bool) -> bool {
        self.0 & Self::bit_for(color, kingside) != 0
    }

    #[inline]
    pub fn set(&mut self, color: Color, kingside: bool) {
        self.0 |= Self::bit_for(color, kingside);
    }

    #[inline]
    pub fn remove(&mut self, color: Color, kingside: bool) {
        self.0 &= !Self::bit_for(color, kingside);
    }

    /// Rights remaining after a move touching `from` and `to`.
    #[inline]
    #[must_use]
    pub(crate) const fn after_move(self, from: Square, to: Square) -> Self {
        CastlingRights(self.0 & !(rights_mask_for(from.index()) | rights_mask_for(to.index())))
    }

    /// Raw bitmask (bit 0 = White kingside ... bit 3 = Black queenside)
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        CastlingRights(value & ALL_CASTLING_RIGHTS)
    }

    #[inline]
    const fn bit_for(color: Color, kingside: bool) -> u8 {
        match (color, kingside) {
            (Color::White, true) => CASTLE_WHITE_K,
            (Color::White, false) => CASTLE_WHITE_Q,
            (Color::Black, true) => CASTLE_BLACK_K,
            (Color::Black, false) => CASTLE_BLACK_Q,
        }
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "-");
        }
        for (bit, c) in [
            (CASTLE_WHITE_K, 'K'),
            (CASTLE_WHITE_Q, 'Q'),
            (CASTLE_BLACK_K, 'k'),
            (CASTLE_BLACK_Q, 'q'),
        ] {
            if self.0 & bit != 0 {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_king_move_clears_both_rights() {
        let rights = CastlingRights::all().after_move(Square::E1, Square::F1);
        assert!(!rights.has(Color::White, true));
        assert!(!rights.has(Color::White, false));
        assert!(rights.has(Color::Black, true));
        assert!(rights.has(Color::Black, false));
    }

    #[test]
    fn test_rook_capture_clears_victim_right() {
        let rights = CastlingRights::all().after_move(Square::from_index(46), Square::H8);
        assert!(!rights.has(Color::Black, true));
        assert!(rights.has(Color::Black, false));
    }

    #[test]
    fn test_castle_rook_squares() {
        assert_eq!(castle_rook_squares(Square::G1), (Square::H1, Square::F1));
        assert_eq!(castle_rook_squares(Square::C8), (Square::A8, Square::D8));
    }

    #[test]
    fn test_display() {
        assert_eq!(CastlingRights::all().to_string(), "KQkq");
        assert_eq!(CastlingRights::none().to_string(), "-");
        let mut r = CastlingRights::none();
        r.set(Color::Black, false);
        assert_eq!(r.to_string(), "q");
    }
}
