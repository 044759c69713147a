use super::super::{MoveList, Piece, Position};
use super::GenType;
use crate::board::attack_tables::piece_attacks;

const SLIDERS: [Piece; 3] = [Piece::Bishop, Piece::Rook, Piece::Queen];

impl Position {
    pub(super) fn generate_slider_moves(&self, gen: GenType, moves: &mut MoveList) {
        let targets = self.target_mask(gen);
        for piece in SLIDERS {
            for from in self.pieces(self.side_to_move, piece) {
                let attacks = piece_attacks(piece, from, self.all_occupied);
                self.push_piece_moves(from, attacks & targets, moves);
            }
        }
    }
}
