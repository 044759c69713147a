//! Precomputed attack tables for leaper pieces (knights, kings, pawns).

use once_cell::sync::Lazy;

const KNIGHT_DELTAS: [(isize, isize); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

const KING_DELTAS: [(isize, isize); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

fn leaper_table(deltas: &[(isize, isize)]) -> [u64; 64] {
    let mut attacks = [0u64; 64];
    for (sq, slot) in attacks.iter_mut().enumerate() {
        let r = (sq / 8) as isize;
        let f = (sq % 8) as isize;
        let mut mask = 0u64;
        for &(dr, df) in deltas {
            let nr = r + dr;
            let nf = f + df;
            if (0..8).contains(&nr) && (0..8).contains(&nf) {
                mask |= 1u64 << (nr * 8 + nf);
            }
        }
        *slot = mask;
    }
    attacks
}

pub(crate) static KNIGHT_ATTACKS: Lazy<[u64; 64]> = Lazy::new(|| leaper_table(&KNIGHT_DELTAS));

pub(crate) static KING_ATTACKS: Lazy<[u64; 64]> = Lazy::new(|| leaper_table(&KING_DELTAS));

/// `PAWN_ATTACKS[color][sq]`: squares a pawn of `color` standing on `sq` attacks.
pub(crate) static PAWN_ATTACKS: Lazy<[[u64; 64]; 2]> = Lazy::new(|| {
    [
        leaper_table(&[(1, -1), (1, 1)]),
        leaper_table(&[(-1, -1), (-1, 1)]),
    ]
});
