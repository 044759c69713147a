//! Zobrist hashing for chess positions.
//!
//! A position's fingerprint is the XOR of one pseudo-random key per
//! (color, piece, square) occupied, plus keys for side to move, each
//! castling-right bit and the en-passant file. [`full_hash`] recomputes it
//! from scratch; [`update_hash`] derives the child fingerprint from the parent
//! by XOR-ing out retired features and XOR-ing in new ones.

use once_cell::sync::Lazy;
use rand::prelude::*;

use crate::board::{castle_rook_squares, CastlingRights, Color, Move, Piece, Position, Square};

pub(crate) struct ZobristKeys {
    // piece_keys[color][piece][square]
    piece_keys: [[[u64; 64]; 6]; 2],
    black_to_move_key: u64,
    // one key per castling-right bit (K, Q, k, q)
    castling_keys: [u64; 4],
    // only the file of the en-passant target matters
    en_passant_keys: [u64; 8],
}

impl ZobristKeys {
    fn new() -> Self {
        // Fixed seed so fingerprints are reproducible across runs.
        let mut rng = StdRng::seed_from_u64(1_234_567_890);
        let mut piece_keys = [[[0u64; 64]; 6]; 2];
        for color in &mut piece_keys {
            for piece in color.iter_mut() {
                for key in piece.iter_mut() {
                    *key = rng.gen();
                }
            }
        }
        let black_to_move_key = rng.gen();
        let mut castling_keys = [0u64; 4];
        for key in &mut castling_keys {
            *key = rng.gen();
        }
        let mut en_passant_keys = [0u64; 8];
        for key in &mut en_passant_keys {
            *key = rng.gen();
        }

        ZobristKeys {
            piece_keys,
            black_to_move_key,
            castling_keys,
            en_passant_keys,
        }
    }
}

static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::new);

#[inline]
pub(crate) fn piece_key(color: Color, piece: Piece, sq: Square) -> u64 {
    ZOBRIST.piece_keys[color.index()][piece.index()][sq.index()]
}

#[inline]
pub(crate) fn side_key() -> u64 {
    ZOBRIST.black_to_move_key
}

/// Combined key for every castling right currently held
#[inline]
pub(crate) fn castling_key(rights: CastlingRights) -> u64 {
    let bits = rights.as_u8();
    ZOBRIST
        .castling_keys
        .iter()
        .enumerate()
        .filter(|(i, _)| bits & (1 << i) != 0)
        .fold(0, |acc, (_, key)| acc ^ key)
}

#[inline]
pub(crate) fn en_passant_key(target: Option<Square>) -> u64 {
    target.map_or(0, |sq| ZOBRIST.en_passant_keys[sq.file()])
}

/// The parts of a position's state that a move can change without them being
/// visible in the move itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashState {
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
}

/// Recompute a position's fingerprint from scratch.
#[must_use]
pub fn full_hash(pos: &Position) -> u64 {
    let mut hash = 0u64;
    for color in Color::BOTH {
        for piece in Piece::ALL {
            for sq in pos.pieces(color, piece) {
                hash ^= piece_key(color, piece, sq);
            }
        }
    }
    if pos.side_to_move() == Color::Black {
        hash ^= side_key();
    }
    hash ^= castling_key(pos.castling_rights());
    hash ^= en_passant_key(pos.en_passant());
    hash
}

/// Fingerprint of the position reached by playing `mv` from a position whose
/// fingerprint is `prev`.
///
/// `moved` is the piece standing on the origin square, `captured` the piece
/// removed by the move (for en passant, the pawn behind the target square),
/// `before`/`after` the castling and en-passant state on either side of it.
#[must_use]
pub fn update_hash(
    prev: u64,
    mv: Move,
    mover: Color,
    moved: Piece,
    captured: Option<Piece>,
    before: HashState,
    after: HashState,
) -> u64 {
    let from = mv.from();
    let to = mv.to();
    let mut hash = prev ^ side_key();

    hash ^= piece_key(mover, moved, from);
    hash ^= piece_key(mover, mv.promotion().unwrap_or(moved), to);

    if let Some(victim) = captured {
        let victim_sq = if mv.is_en_passant() {
            to.offset_rank(-mover.pawn_direction()).unwrap_or(to)
        } else {
            to
        };
        hash ^= piece_key(mover.opponent(), victim, victim_sq);
    }

    if mv.is_castling() {
        let (rook_from, rook_to) = castle_rook_squares(to);
        hash ^= piece_key(mover, Piece::Rook, rook_from);
        hash ^= piece_key(mover, Piece::Rook, rook_to);
    }

    hash ^= castling_key(before.castling) ^ castling_key(after.castling);
    hash ^= en_passant_key(before.en_passant) ^ en_passant_key(after.en_passant);
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_deterministic_and_distinct() {
        let a = piece_key(Color::White, Piece::Pawn, Square::A1);
        let b = piece_key(Color::Black, Piece::Pawn, Square::A1);
        let c = piece_key(Color::White, Piece::Knight, Square::A1);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, ZobristKeys::new().piece_keys[0][0][0]);
    }

    #[test]
    fn test_castling_key_combines_bits() {
        let mut white_k = CastlingRights::none();
        white_k.set(Color::White, true);
        let mut black_q = CastlingRights::none();
        black_q.set(Color::Black, false);
        let mut both = white_k;
        both.set(Color::Black, false);
        assert_eq!(castling_key(both), castling_key(white_k) ^ castling_key(black_q));
        assert_eq!(castling_key(CastlingRights::none()), 0);
    }

    #[test]
    fn test_startpos_hash_matches_full_recompute() {
        let pos = Position::new();
        assert_eq!(pos.hash(), full_hash(&pos));
    }

    #[test]
    fn test_update_hash_matches_full_hash_after_special_moves() {
        let cases = [
            ("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", "e1g1"),
            ("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1", "e8c8"),
            ("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3", "e5f6"),
            ("n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1", "g2h1q"),
            ("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", "a1a8"),
            ("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", "e2e4"),
            ("rnbqkbnr/ppp1pppp/8/8/3p4/8/PPPPPPPP/RNBQKBNR w KQkq - 0 3", "e2e4"),
        ];
        for (fen, uci) in cases {
            let mut pos = Position::from_fen(fen);
            let mv = pos.parse_move(uci).unwrap();
            pos.make_move(mv);
            assert_eq!(pos.hash(), full_hash(&pos), "{fen} {uci}");
        }
    }
}
