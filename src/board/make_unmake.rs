use crate::zobrist::{self, HashState};

use super::{castle_rook_squares, Color, Move, NullMoveInfo, Piece, Position, UnmakeInfo};

impl Position {
    /// Apply `mv`, which must be legal in this position.
    ///
    /// Passing a move whose origin does not hold a piece of the side to move
    /// is a programming error: it panics in debug builds and leaves the
    /// position untouched in release builds (the returned info makes the
    /// matching `unmake_move` a no-op as well).
    pub fn make_move(&mut self, mv: Move) -> UnmakeInfo {
        let us = self.side_to_move;
        let them = us.opponent();
        let from = mv.from();
        let to = mv.to();

        let mut info = UnmakeInfo {
            moved: None,
            captured: None,
            previous_en_passant: self.en_passant,
            previous_castling: self.castling,
            previous_halfmove_clock: self.halfmove_clock,
            previous_fullmove_number: self.fullmove_number,
            previous_hash: self.hash,
        };

        let moved = match self.piece_at(from) {
            Some((color, piece)) if color == us => piece,
            _ => {
                debug_assert!(false, "make_move {mv} from a square without a {us} piece");
                log::warn!("ignoring make_move {mv}: no {us} piece on {from}");
                return info;
            }
        };

        let captured = if mv.is_en_passant() {
            Some(Piece::Pawn)
        } else {
            match self.piece_at(to) {
                Some((color, piece)) if color == them => Some(piece),
                _ => None,
            }
        };

        if let Some(victim) = captured {
            let victim_sq = if mv.is_en_passant() {
                to.offset_rank(-us.pawn_direction()).unwrap_or(to)
            } else {
                to
            };
            self.remove_piece(victim_sq, them, victim);
        }

        self.remove_piece(from, us, moved);
        self.set_piece(to, us, mv.promotion().unwrap_or(moved));

        if mv.is_castling() {
            let (rook_from, rook_to) = castle_rook_squares(to);
            self.remove_piece(rook_from, us, Piece::Rook);
            self.set_piece(rook_to, us, Piece::Rook);
        }

        let before = HashState {
            castling: self.castling,
            en_passant: self.en_passant,
        };
        self.castling = self.castling.after_move(from, to);
        self.en_passant = if mv.is_double_pawn_push() {
            from.offset_rank(us.pawn_direction())
                .and_then(|target| self.capturable_en_passant(target, them))
        } else {
            None
        };
        let after = HashState {
            castling: self.castling,
            en_passant: self.en_passant,
        };

        if moved == Piece::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        self.history.push(self.hash);
        self.hash = zobrist::update_hash(self.hash, mv, us, moved, captured, before, after);
        self.side_to_move = them;

        info.moved = Some(moved);
        info.captured = captured;
        info
    }

    /// Exactly reverse a `make_move(mv)` that returned `info`.
    pub fn unmake_move(&mut self, mv: Move, info: UnmakeInfo) {
        let Some(moved) = info.moved else {
            return;
        };
        let us = self.side_to_move.opponent();
        let them = self.side_to_move;
        let from = mv.from();
        let to = mv.to();

        self.side_to_move = us;
        self.fullmove_number = info.previous_fullmove_number;
        self.history.pop();

        if mv.is_castling() {
            let (rook_from, rook_to) = castle_rook_squares(to);
            self.remove_piece(rook_to, us, Piece::Rook);
            self.set_piece(rook_from, us, Piece::Rook);
        }

        self.remove_piece(to, us, mv.promotion().unwrap_or(moved));
        self.set_piece(from, us, moved);

        if let Some(victim) = info.captured {
            let victim_sq = if mv.is_en_passant() {
                to.offset_rank(-us.pawn_direction()).unwrap_or(to)
            } else {
                to
            };
            self.set_piece(victim_sq, them, victim);
        }

        self.en_passant = info.previous_en_passant;
        self.castling = info.previous_castling;
        self.halfmove_clock = info.previous_halfmove_clock;
        self.hash = info.previous_hash;
    }

    /// Pass the turn. Clears the en-passant target and resets the halfmove
    /// clock so repetition scans stop at the null move.
    pub fn make_null_move(&mut self) -> NullMoveInfo {
        let info = NullMoveInfo {
            previous_en_passant: self.en_passant,
            previous_halfmove_clock: self.halfmove_clock,
            previous_hash: self.hash,
        };
        self.history.push(self.hash);
        self.hash ^= zobrist::side_key() ^ zobrist::en_passant_key(self.en_passant);
        self.en_passant = None;
        self.halfmove_clock = 0;
        self.side_to_move = self.side_to_move.opponent();
        info
    }

    pub fn unmake_null_move(&mut self, info: NullMoveInfo) {
        self.side_to_move = self.side_to_move.opponent();
        self.history.pop();
        self.en_passant = info.previous_en_passant;
        self.halfmove_clock = info.previous_halfmove_clock;
        self.hash = info.previous_hash;
    }
}
