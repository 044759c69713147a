//! Property-based tests using proptest.
//!
//! Each property plays a random legal walk from a handful of seed
//! positions and checks an invariant after every step.

use crate::board::search::{HistoryTable, KillerTable};
use crate::board::{Move, Position, Square, UnmakeInfo, MAX_PLY};
use crate::tt::{Bound, TranspositionTable};
use crate::zobrist;
use proptest::prelude::*;
use rand::prelude::*;
use rand::Rng;

const START_FENS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
];

/// Strategy to generate a random legal move sequence length
fn move_count_strategy() -> impl Strategy<Value = usize> {
    1..=24usize
}

/// Strategy to generate a random seed for move selection
fn seed_strategy() -> impl Strategy<Value = u64> {
    any::<u64>()
}

fn start_strategy() -> impl Strategy<Value = Position> {
    (0..START_FENS.len()).prop_map(|i| Position::from_fen(START_FENS[i]))
}

/// Play up to `count` random legal moves, stopping early at a terminal position.
fn random_walk(pos: &mut Position, seed: u64, count: usize) -> Vec<(Move, UnmakeInfo)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut played = Vec::new();
    for _ in 0..count {
        let moves = pos.generate_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves.as_slice()[rng.gen_range(0..moves.len())];
        let info = pos.make_move(mv);
        played.push((mv, info));
    }
    played
}

proptest! {
    /// make_move followed by unmake_move restores the position exactly
    #[test]
    fn prop_make_unmake_restores_state(
        start in start_strategy(),
        seed in seed_strategy(),
        num_moves in move_count_strategy()
    ) {
        let mut pos = start.clone();
        let mut played = random_walk(&mut pos, seed, num_moves);

        while let Some((mv, info)) = played.pop() {
            pos.unmake_move(mv, info);
        }

        prop_assert_eq!(pos.hash(), start.hash());
        prop_assert_eq!(pos.to_fen(), start.to_fen());
        prop_assert_eq!(pos.history_len(), start.history_len());
    }

    /// The incrementally updated hash always equals a from-scratch recomputation
    #[test]
    fn prop_hash_consistency(
        start in start_strategy(),
        seed in seed_strategy(),
        num_moves in move_count_strategy()
    ) {
        let mut pos = start;
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..num_moves {
            let moves = pos.generate_moves();
            if moves.is_empty() {
                break;
            }
            let mv = moves.as_slice()[rng.gen_range(0..moves.len())];
            pos.make_move(mv);
            prop_assert_eq!(pos.hash(), zobrist::full_hash(&pos), "after {}", mv);
        }
    }

    /// FEN output parses back to the same position
    #[test]
    fn prop_fen_roundtrip(
        start in start_strategy(),
        seed in seed_strategy(),
        num_moves in move_count_strategy()
    ) {
        let mut pos = start;
        random_walk(&mut pos, seed, num_moves);

        let fen = pos.to_fen();
        let restored = Position::try_from_fen(&fen);
        prop_assert!(restored.is_ok(), "{} did not parse", fen);
        let restored = restored.unwrap();
        prop_assert_eq!(restored.to_fen(), fen);
        prop_assert_eq!(restored.hash(), pos.hash());
        prop_assert_eq!(restored.side_to_move(), pos.side_to_move());
    }

    /// No generated move leaves the mover's own king attacked
    #[test]
    fn prop_legal_moves_are_legal(
        start in start_strategy(),
        seed in seed_strategy(),
        num_moves in 0..16usize
    ) {
        let mut pos = start;
        random_walk(&mut pos, seed, num_moves);

        let us = pos.side_to_move();
        let moves = pos.generate_moves();
        for &mv in &moves {
            let info = pos.make_move(mv);
            prop_assert!(!pos.is_in_check(us), "{} leaves the king in check", mv);
            pos.unmake_move(mv, info);
        }
    }

    /// perft(1) is exactly the number of generated legal moves
    #[test]
    fn prop_perft_one_matches_movegen(
        start in start_strategy(),
        seed in seed_strategy(),
        num_moves in 0..16usize
    ) {
        let mut pos = start;
        random_walk(&mut pos, seed, num_moves);

        let count = pos.generate_moves().len() as u64;
        prop_assert_eq!(pos.perft(1), count);
        let divided: u64 = pos.perft_divide(1).iter().map(|(_, n)| n).sum();
        prop_assert_eq!(divided, count);
    }

    /// Tactical generation is the capture/promotion subset of full generation
    #[test]
    fn prop_tactical_subset(
        start in start_strategy(),
        seed in seed_strategy(),
        num_moves in 0..16usize
    ) {
        let mut pos = start;
        random_walk(&mut pos, seed, num_moves);
        if pos.is_in_check(pos.side_to_move()) {
            return Ok(());
        }

        let all = pos.generate_moves();
        let tactical = pos.generate_tactical_moves();
        for &mv in &tactical {
            prop_assert!(mv.is_tactical());
            prop_assert!(all.contains(mv), "{} not in the full list", mv);
        }
        let expected = all.iter().filter(|mv| mv.is_tactical()).count();
        prop_assert_eq!(tactical.len(), expected);
    }

    // ========================================================================
    // Move ordering tables
    // ========================================================================

    /// Killer updates shift the previous primary into the secondary slot
    #[test]
    fn prop_killer_preserves_moves(
        ply in 0..(MAX_PLY + 8),
        mv1_from in 0..64usize,
        mv1_to in 0..64usize,
        mv2_from in 0..64usize,
        mv2_to in 0..64usize
    ) {
        let mut table = KillerTable::new();
        let mv1 = Move::quiet(Square::from_index(mv1_from), Square::from_index(mv1_to));
        let mv2 = Move::quiet(Square::from_index(mv2_from), Square::from_index(mv2_to));

        table.update(ply, mv1);
        if ply < MAX_PLY {
            prop_assert_eq!(table.primary(ply), mv1);
        } else {
            prop_assert!(table.primary(ply).is_null());
        }

        if mv1 != mv2 && ply < MAX_PLY {
            table.update(ply, mv2);
            prop_assert_eq!(table.primary(ply), mv2);
            prop_assert_eq!(table.secondary(ply), mv1);
        }
    }

    /// History stays inside the killer band no matter how often it is bumped
    #[test]
    fn prop_history_bounded(
        mv_from in 0..64usize,
        mv_to in 0..64usize,
        depth in 1..40u32,
        rewards in 0..50usize,
        penalties in 0..50usize
    ) {
        let mut table = HistoryTable::new();
        let mv = Move::quiet(Square::from_index(mv_from), Square::from_index(mv_to));
        for _ in 0..rewards {
            table.update(mv, depth);
        }
        for _ in 0..penalties {
            table.penalize(mv, depth);
        }
        let limit = crate::board::search::constants::HISTORY_MAX;
        prop_assert!((-limit..=limit).contains(&table.score(mv)));

        let before = table.score(mv).abs();
        table.decay(2);
        prop_assert!(table.score(mv).abs() <= before);
    }

    // ========================================================================
    // Transposition table
    // ========================================================================

    /// A stored entry is found again with the same data
    #[test]
    fn prop_tt_store_retrieve(
        hash in any::<u64>(),
        depth in 0..100u32,
        score in -10000..10000i32
    ) {
        let tt = TranspositionTable::new(1);
        tt.store(hash, depth, score, Bound::Exact, None);

        let entry = tt.probe(hash);
        prop_assert!(entry.is_some());
        let entry = entry.unwrap();
        prop_assert_eq!(entry.depth(), depth);
        prop_assert_eq!(entry.score(), score);
        prop_assert_eq!(entry.bound(), Bound::Exact);
        prop_assert_eq!(entry.best_move(), None);
    }
}
