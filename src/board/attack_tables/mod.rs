//! Attack tables for move generation and attack queries.
//!
//! Leaper attacks (knight, king, pawn) are plain per-square lookups.
//! Sliding attacks (bishop, rook, queen) use Hyperbola Quintessence: the
//! `o^(o-2r)` trick along a line mask, with a byteswap for the reverse
//! direction and a small lookup table for ranks where byteswap does not help.
//!
//! All tables are built lazily on first use; [`init`] forces them so that
//! construction happens once, up front, instead of inside a timed search.

#![allow(clippy::needless_range_loop)]

mod tables;

use once_cell::sync::Lazy;

use super::{Bitboard, Color, Piece, Square};
use tables::{KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS};

const FILE_A: u64 = 0x0101_0101_0101_0101;

fn line_mask(sq: usize, dr: isize, df: isize) -> u64 {
    let mut mask = 0u64;
    for sign in [1isize, -1] {
        let mut r = (sq / 8) as isize;
        let mut f = (sq % 8) as isize;
        while (0..8).contains(&r) && (0..8).contains(&f) {
            mask |= 1u64 << (r * 8 + f);
            r += dr * sign;
            f += df * sign;
        }
    }
    mask
}

/// Diagonal (a1-h8 direction) masks, including the square itself
static DIAG_MASKS: Lazy<[u64; 64]> = Lazy::new(|| {
    let mut masks = [0u64; 64];
    for sq in 0..64 {
        masks[sq] = line_mask(sq, 1, 1);
    }
    masks
});

/// Anti-diagonal (h1-a8 direction) masks, including the square itself
static ANTI_MASKS: Lazy<[u64; 64]> = Lazy::new(|| {
    let mut masks = [0u64; 64];
    for sq in 0..64 {
        masks[sq] = line_mask(sq, 1, -1);
    }
    masks
});

/// Rank attack lookup: `[8 * inner_occupancy + file]`, attacks shifted to rank 1.
/// Only the six inner files (b-g) can block, so 64 occupancy patterns suffice.
static RANK_ATTACKS: Lazy<[u64; 512]> = Lazy::new(|| {
    let mut attacks = [0u64; 512];
    for occ in 0..64usize {
        for file in 0..8usize {
            let blocked = |f: usize| (1..=6).contains(&f) && occ & (1 << (f - 1)) != 0;
            let mut attack = 0u64;
            for f in (file + 1)..8 {
                attack |= 1u64 << f;
                if blocked(f) {
                    break;
                }
            }
            for f in (0..file).rev() {
                attack |= 1u64 << f;
                if blocked(f) {
                    break;
                }
            }
            attacks[8 * occ + file] = attack;
        }
    }
    attacks
});

#[inline(always)]
fn hyperbola(occupied: u64, mask: u64, square: usize) -> u64 {
    // The line excludes the origin so the result does not depend on whether
    // the origin itself is occupied.
    let piece_bit = 1u64 << square;
    let line = mask & !piece_bit;
    let forward = occupied & line;
    let reverse = forward.swap_bytes();
    let forward = forward.wrapping_sub(piece_bit);
    let reverse = reverse.wrapping_sub(piece_bit.swap_bytes());
    (forward ^ reverse.swap_bytes()) & line
}

#[inline(always)]
fn file_attacks(occupied: u64, square: usize) -> u64 {
    hyperbola(occupied, FILE_A << (square % 8), square)
}

#[inline(always)]
fn rank_attacks(occupied: u64, square: usize) -> u64 {
    let shift = square & 56;
    let inner = ((occupied >> shift) >> 1) & 63;
    RANK_ATTACKS[8 * inner as usize + (square & 7)] << shift
}

/// Bishop attacks from `sq` given total board occupancy
#[inline]
#[must_use]
pub(crate) fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let s = sq.index();
    Bitboard(hyperbola(occupied.0, DIAG_MASKS[s], s) | hyperbola(occupied.0, ANTI_MASKS[s], s))
}

/// Rook attacks from `sq` given total board occupancy
#[inline]
#[must_use]
pub(crate) fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let s = sq.index();
    Bitboard(file_attacks(occupied.0, s) | rank_attacks(occupied.0, s))
}

#[inline]
#[must_use]
pub(crate) fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

#[inline]
#[must_use]
pub(crate) fn knight_attacks(sq: Square) -> Bitboard {
    Bitboard(KNIGHT_ATTACKS[sq.index()])
}

#[inline]
#[must_use]
pub(crate) fn king_attacks(sq: Square) -> Bitboard {
    Bitboard(KING_ATTACKS[sq.index()])
}

/// Squares attacked by a pawn of `color` on `sq`
#[inline]
#[must_use]
pub(crate) fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    Bitboard(PAWN_ATTACKS[color.index()][sq.index()])
}

/// Attack set of a non-pawn piece on `sq` for the given occupancy.
#[inline]
#[must_use]
pub(crate) fn piece_attacks(piece: Piece, sq: Square, occupied: Bitboard) -> Bitboard {
    match piece {
        Piece::Knight => knight_attacks(sq),
        Piece::Bishop => bishop_attacks(sq, occupied),
        Piece::Rook => rook_attacks(sq, occupied),
        Piece::Queen => queen_attacks(sq, occupied),
        Piece::King => king_attacks(sq),
        // Pawn attacks depend on color; callers use `pawn_attacks` for pawns.
        Piece::Pawn => Bitboard::EMPTY,
    }
}

/// Build every table now rather than on first use.
pub fn init() {
    Lazy::force(&KNIGHT_ATTACKS);
    Lazy::force(&KING_ATTACKS);
    Lazy::force(&PAWN_ATTACKS);
    Lazy::force(&DIAG_MASKS);
    Lazy::force(&ANTI_MASKS);
    Lazy::force(&RANK_ATTACKS);
}
