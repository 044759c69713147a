//! Static evaluation.
//!
//! The search treats evaluation as an oracle behind the [`Evaluator`] trait.
//! [`MaterialEvaluator`] is the default: material plus piece-square tables,
//! tapered between middlegame and endgame by remaining material.

use super::pst::{MATERIAL_EG, MATERIAL_MG, MAX_PHASE, PHASE_WEIGHTS, PST_EG, PST_MG};
use super::{Color, Piece, Position};

/// Scores a position in centipawns from the side to move's point of view.
///
/// Implementations must be deterministic for a given position and must not
/// return values in the mate range.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, pos: &Position) -> i32;
}

/// Material and piece-square evaluation.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaterialEvaluator;

impl MaterialEvaluator {
    /// Score from White's point of view.
    #[must_use]
    pub fn white_relative(pos: &Position) -> i32 {
        let mut mg = 0;
        let mut eg = 0;
        let mut phase = 0;

        for color in Color::BOTH {
            let sign = if color == Color::White { 1 } else { -1 };
            for piece in Piece::ALL {
                let p = piece.index();
                for sq in pos.pieces(color, piece) {
                    let idx = match color {
                        Color::White => sq.index(),
                        Color::Black => sq.flip_vertical().index(),
                    };
                    mg += sign * (MATERIAL_MG[p] + PST_MG[p][idx]);
                    eg += sign * (MATERIAL_EG[p] + PST_EG[p][idx]);
                    phase += PHASE_WEIGHTS[p];
                }
            }
        }

        let phase = phase.min(MAX_PHASE);
        (mg * phase + eg * (MAX_PHASE - phase)) / MAX_PHASE
    }
}

impl Evaluator for MaterialEvaluator {
    fn evaluate(&self, pos: &Position) -> i32 {
        let score = Self::white_relative(pos);
        match pos.side_to_move() {
            Color::White => score,
            Color::Black => -score,
        }
    }
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    fn evaluate(&self, pos: &Position) -> i32 {
        (**self).evaluate(pos)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for std::sync::Arc<E> {
    fn evaluate(&self, pos: &Position) -> i32 {
        (**self).evaluate(pos)
    }
}
