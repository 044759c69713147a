use super::super::{Bitboard, Color, Move, MoveList, Piece, Position, Square, PROMOTION_PIECES};
use super::GenType;
use crate::board::attack_tables::pawn_attacks;

impl Position {
    pub(super) fn generate_pawn_moves(&self, gen: GenType, moves: &mut MoveList) {
        let us = self.side_to_move;
        let them = us.opponent();
        let dir = us.pawn_direction();
        let empty = !self.all_occupied;
        let enemy = self.occupied_by(them);
        let (start_rank, last_rank) = match us {
            Color::White => (1, Bitboard::RANK_8),
            Color::Black => (6, Bitboard::RANK_1),
        };
        let en_passant = self.en_passant_capture_square();

        for from in self.pieces(us, Piece::Pawn) {
            if let Some(one) = from.offset_rank(dir).filter(|&sq| empty.contains(sq)) {
                if last_rank.contains(one) {
                    for promo in PROMOTION_PIECES {
                        moves.push(Move::new_promotion(from, one, promo));
                    }
                } else if gen == GenType::All {
                    moves.push(Move::quiet(from, one));
                    if from.rank() == start_rank {
                        if let Some(two) = one.offset_rank(dir).filter(|&sq| empty.contains(sq)) {
                            moves.push(Move::double_pawn_push(from, two));
                        }
                    }
                }
            }

            let attacks = pawn_attacks(us, from);
            for to in attacks & enemy {
                if last_rank.contains(to) {
                    for promo in PROMOTION_PIECES {
                        moves.push(Move::new_promotion_capture(from, to, promo));
                    }
                } else {
                    moves.push(Move::capture(from, to));
                }
            }

            if let Some(target) = en_passant.filter(|&sq| attacks.contains(sq)) {
                moves.push(Move::en_passant(from, target));
            }
        }
    }

    /// `target` if a `capturer` pawn attacks it. Targets nobody can take are
    /// never stored, so positions that differ only by a dead target hash
    /// and repeat alike.
    pub(crate) fn capturable_en_passant(&self, target: Square, capturer: Color) -> Option<Square> {
        let attackers =
            pawn_attacks(capturer.opponent(), target) & self.pieces(capturer, Piece::Pawn);
        (!attackers.is_empty()).then_some(target)
    }

    /// The en-passant target, if a capture onto it is actually possible: the
    /// square is empty, on the right rank, and an enemy pawn stands behind it.
    fn en_passant_capture_square(&self) -> Option<Square> {
        let us = self.side_to_move;
        let target = self.en_passant?;
        let expected_rank = match us {
            Color::White => 5,
            Color::Black => 2,
        };
        if target.rank() != expected_rank || self.all_occupied.contains(target) {
            return None;
        }
        let victim = target.offset_rank(-us.pawn_direction())?;
        self.pieces(us.opponent(), Piece::Pawn)
            .contains(victim)
            .then_some(target)
    }
}
