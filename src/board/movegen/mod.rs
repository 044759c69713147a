mod kings;
mod knights;
mod pawns;
mod sliders;

use super::{Bitboard, Move, MoveList, Position, Square};

/// Which pseudo-legal moves to produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GenType {
    /// Every move.
    All,
    /// Captures (including en passant) and promotions only.
    Tactical,
}

impl Position {
    /// Destination squares a non-pawn piece may move to for `gen`.
    fn target_mask(&self, gen: GenType) -> Bitboard {
        let us = self.side_to_move;
        match gen {
            GenType::All => !self.occupied_by(us),
            GenType::Tactical => self.occupied_by(us.opponent()),
        }
    }

    /// Push one move per target square, flagging captures of enemy pieces.
    fn push_piece_moves(&self, from: Square, targets: Bitboard, moves: &mut MoveList) {
        let enemy = self.occupied_by(self.side_to_move.opponent());
        for to in targets {
            if enemy.contains(to) {
                moves.push(Move::capture(from, to));
            } else {
                moves.push(Move::quiet(from, to));
            }
        }
    }

    fn generate_pseudo_moves(&self, gen: GenType, moves: &mut MoveList) {
        self.generate_pawn_moves(gen, moves);
        self.generate_knight_moves(gen, moves);
        self.generate_slider_moves(gen, moves);
        self.generate_king_moves(gen, moves);
    }

    /// Drop moves that leave the mover's king attacked.
    fn retain_legal(&mut self, moves: &mut MoveList) {
        let us = self.side_to_move;
        moves.retain(|mv| {
            let info = self.make_move(mv);
            let legal = !self.is_in_check(us);
            self.unmake_move(mv, info);
            legal
        });
    }

    /// All legal moves in generation order: pawns, knights, sliders, king.
    #[must_use]
    pub fn generate_moves(&mut self) -> MoveList {
        let mut moves = MoveList::new();
        self.generate_pseudo_moves(GenType::All, &mut moves);
        self.retain_legal(&mut moves);
        moves
    }

    /// Legal captures and promotions, used by quiescence search.
    pub(crate) fn generate_tactical_moves(&mut self) -> MoveList {
        let mut moves = MoveList::new();
        self.generate_pseudo_moves(GenType::Tactical, &mut moves);
        self.retain_legal(&mut moves);
        moves
    }

    /// True if the side to move has at least one legal move.
    #[must_use]
    pub fn has_legal_move(&mut self) -> bool {
        !self.generate_moves().is_empty()
    }

    #[must_use]
    pub fn is_checkmate(&mut self) -> bool {
        self.is_in_check(self.side_to_move) && !self.has_legal_move()
    }

    #[must_use]
    pub fn is_stalemate(&mut self) -> bool {
        !self.is_in_check(self.side_to_move) && !self.has_legal_move()
    }
}
