use super::super::{MoveList, Piece, Position};
use super::GenType;
use crate::board::attack_tables::knight_attacks;

impl Position {
    pub(super) fn generate_knight_moves(&self, gen: GenType, moves: &mut MoveList) {
        let targets = self.target_mask(gen);
        for from in self.pieces(self.side_to_move, Piece::Knight) {
            self.push_piece_moves(from, knight_attacks(from) & targets, moves);
        }
    }
}
