use super::super::{Bitboard, Color, Move, MoveList, Piece, Position, Square};
use super::GenType;
use crate::board::attack_tables::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks,
};

impl Position {
    pub(super) fn generate_king_moves(&self, gen: GenType, moves: &mut MoveList) {
        let us = self.side_to_move;
        let Some(from) = self.king_square(us) else {
            return;
        };
        self.push_piece_moves(from, king_attacks(from) & self.target_mask(gen), moves);

        if gen == GenType::All {
            self.generate_castling_moves(from, moves);
        }
    }

    /// Castling needs the right, the rook at home, empty squares between
    /// king and rook, and a king that is neither in check nor passing over
    /// an attacked square. Landing on an attacked square is left to the
    /// legality filter.
    fn generate_castling_moves(&self, from: Square, moves: &mut MoveList) {
        let us = self.side_to_move;
        let them = us.opponent();
        let rank = us.back_rank();
        let home = |file| Square::new(rank, file);
        if Some(from) != home(4) {
            return;
        }
        let rooks = self.pieces(us, Piece::Rook);
        let empty = |files: &[usize]| {
            files
                .iter()
                .filter_map(|&f| home(f))
                .all(|sq| !self.all_occupied.contains(sq))
        };
        let safe = |file| home(file).is_some_and(|sq| !self.is_square_attacked(sq, them));

        let kingside = self.castling.has(us, true)
            && home(7).is_some_and(|sq| rooks.contains(sq))
            && empty(&[5, 6]);
        let queenside = self.castling.has(us, false)
            && home(0).is_some_and(|sq| rooks.contains(sq))
            && empty(&[1, 2, 3]);
        if !(kingside || queenside) || !safe(4) {
            return;
        }

        if kingside && safe(5) {
            if let Some(to) = home(6) {
                moves.push(Move::castle_kingside(from, to));
            }
        }
        if queenside && safe(3) {
            if let Some(to) = home(2) {
                moves.push(Move::castle_queenside(from, to));
            }
        }
    }

    /// Pieces of either color attacking `sq` given `occupied` as blockers.
    pub(crate) fn attackers_to(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let both = |piece| self.pieces(Color::White, piece) | self.pieces(Color::Black, piece);
        let queens = both(Piece::Queen);
        (pawn_attacks(Color::Black, sq) & self.pieces(Color::White, Piece::Pawn))
            | (pawn_attacks(Color::White, sq) & self.pieces(Color::Black, Piece::Pawn))
            | (knight_attacks(sq) & both(Piece::Knight))
            | (king_attacks(sq) & both(Piece::King))
            | (bishop_attacks(sq, occupied) & (both(Piece::Bishop) | queens))
            | (rook_attacks(sq, occupied) & (both(Piece::Rook) | queens))
    }

    /// Pieces of `by` that attack `sq`.
    #[must_use]
    pub fn attacks_on(&self, sq: Square, by: Color) -> Bitboard {
        self.attackers_to(sq, self.all_occupied) & self.occupied_by(by)
    }

    #[must_use]
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        !self.attacks_on(sq, by).is_empty()
    }

    /// True if `color`'s king is attacked. A side without a king is never in check.
    #[must_use]
    pub fn is_in_check(&self, color: Color) -> bool {
        self.king_square(color)
            .is_some_and(|king| self.is_square_attacked(king, color.opponent()))
    }
}
