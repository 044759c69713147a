use super::{Bitboard, CastlingRights, Color, Piece, Square};
use crate::zobrist;

/// Initial capacity of the fingerprint history: a long game plus a full
/// search path, so the hot path never reallocates.
const HISTORY_CAPACITY: usize = 1024;

/// State needed to reverse one `make_move`.
///
/// Returned by [`Position::make_move`] and handed back to
/// [`Position::unmake_move`]; the search keeps one per ply on its stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnmakeInfo {
    /// `None` when the move was rejected as a precondition violation.
    pub(crate) moved: Option<Piece>,
    pub(crate) captured: Option<Piece>,
    pub(crate) previous_en_passant: Option<Square>,
    pub(crate) previous_castling: CastlingRights,
    pub(crate) previous_halfmove_clock: u32,
    pub(crate) previous_fullmove_number: u32,
    pub(crate) previous_hash: u64,
}

impl UnmakeInfo {
    /// Piece captured by the move, if any
    #[must_use]
    pub fn captured(&self) -> Option<Piece> {
        self.captured
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NullMoveInfo {
    pub(crate) previous_en_passant: Option<Square>,
    pub(crate) previous_halfmove_clock: u32,
    pub(crate) previous_hash: u64,
}

/// A chess position: bitboard piece placement plus game state.
///
/// Mutated only through paired `make_move`/`unmake_move` (and the null-move
/// pair); `hash` is maintained incrementally and always equals
/// [`zobrist::full_hash`] of the position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub(crate) pieces: [[Bitboard; 6]; 2],
    pub(crate) occupied: [Bitboard; 2],
    pub(crate) all_occupied: Bitboard,
    pub(crate) side_to_move: Color,
    pub(crate) en_passant: Option<Square>,
    pub(crate) castling: CastlingRights,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
    pub(crate) hash: u64,
    /// Fingerprints of every earlier position in the game and on the current
    /// search path, oldest first. One entry is pushed per make and popped per
    /// unmake.
    pub(crate) history: Vec<u64>,
}

impl Position {
    /// The standard starting position.
    #[must_use]
    pub fn new() -> Self {
        let mut pos = Position::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, &piece) in back_rank.iter().enumerate() {
            pos.set_piece(Square::from_index(file), Color::White, piece);
            pos.set_piece(Square::from_index(8 + file), Color::White, Piece::Pawn);
            pos.set_piece(Square::from_index(48 + file), Color::Black, Piece::Pawn);
            pos.set_piece(Square::from_index(56 + file), Color::Black, piece);
        }
        pos.castling = CastlingRights::all();
        pos.hash = zobrist::full_hash(&pos);
        pos
    }

    pub(crate) fn empty() -> Self {
        Position {
            pieces: [[Bitboard::EMPTY; 6]; 2],
            occupied: [Bitboard::EMPTY; 2],
            all_occupied: Bitboard::EMPTY,
            side_to_move: Color::White,
            en_passant: None,
            castling: CastlingRights::none(),
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
            history: Vec::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Current fingerprint
    #[inline]
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    #[must_use]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Number of positions recorded before this one (game plus search path).
    #[inline]
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    #[inline]
    #[must_use]
    pub fn pieces(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[color.index()][piece.index()]
    }

    #[inline]
    #[must_use]
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        self.occupied[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn occupied(&self) -> Bitboard {
        self.all_occupied
    }

    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        if !self.all_occupied.contains(sq) {
            return None;
        }
        let color = if self.occupied[0].contains(sq) {
            Color::White
        } else {
            Color::Black
        };
        Piece::ALL
            .into_iter()
            .find(|&piece| self.pieces(color, piece).contains(sq))
            .map(|piece| (color, piece))
    }

    #[must_use]
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.piece_at(sq).map(|(_, piece)| piece)
    }

    #[inline]
    #[must_use]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color, Piece::King).lsb()
    }

    pub(crate) fn set_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        let bit = Bitboard::from_square(sq);
        self.pieces[color.index()][piece.index()] |= bit;
        self.occupied[color.index()] |= bit;
        self.all_occupied |= bit;
    }

    pub(crate) fn remove_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        let bit = !Bitboard::from_square(sq);
        self.pieces[color.index()][piece.index()] &= bit;
        self.occupied[color.index()] &= bit;
        self.all_occupied &= bit;
    }

    /// True if `color` has any piece other than pawns and king.
    #[must_use]
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        let c = color.index();
        !(self.pieces[c][Piece::Knight.index()]
            | self.pieces[c][Piece::Bishop.index()]
            | self.pieces[c][Piece::Rook.index()]
            | self.pieces[c][Piece::Queen.index()])
        .is_empty()
    }

    /// Occurrences of the current position since the last irreversible move,
    /// counting the current one.
    #[must_use]
    pub fn repetition_count(&self) -> usize {
        let len = self.history.len();
        let window = (self.halfmove_clock as usize).min(len);
        1 + self.history[len - window..]
            .iter()
            .filter(|&&h| h == self.hash)
            .count()
    }

    /// Repetition test used inside the search. Any recurrence of a position
    /// reached after `search_root` counts; otherwise the position must have
    /// occurred twice before (a threefold repetition).
    pub(crate) fn is_repetition(&self, search_root: usize) -> bool {
        let len = self.history.len();
        let window = (self.halfmove_clock as usize).min(len);
        let mut earlier = 0;
        for idx in (len - window..len).rev() {
            if self.history[idx] == self.hash {
                if idx >= search_root {
                    return true;
                }
                earlier += 1;
                if earlier >= 2 {
                    return true;
                }
            }
        }
        false
    }

    #[must_use]
    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Neither side can possibly mate: bare kings, a single minor piece, or
    /// only bishops that all stand on one square color.
    #[must_use]
    pub fn is_insufficient_material(&self) -> bool {
        let heavy = |c: usize| {
            self.pieces[c][Piece::Pawn.index()]
                | self.pieces[c][Piece::Rook.index()]
                | self.pieces[c][Piece::Queen.index()]
        };
        if !(heavy(0) | heavy(1)).is_empty() {
            return false;
        }
        let knights =
            self.pieces[0][Piece::Knight.index()] | self.pieces[1][Piece::Knight.index()];
        let bishops =
            self.pieces[0][Piece::Bishop.index()] | self.pieces[1][Piece::Bishop.index()];
        let minors = knights.popcount() + bishops.popcount();
        if minors <= 1 {
            return true;
        }
        knights.is_empty()
            && ((bishops & Bitboard::LIGHT_SQUARES).is_empty()
                || (bishops & Bitboard::DARK_SQUARES).is_empty())
    }

    /// Drawn by the fifty-move rule, threefold repetition or insufficient material.
    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.is_fifty_move_draw() || self.repetition_count() >= 3 || self.is_insufficient_material()
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new()
    }
}
