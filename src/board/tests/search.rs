//! Search algorithm tests.
//!
//! Tests for alpha-beta, quiescence, pruning, draw handling and the
//! search bookkeeping (PV, iterations, limits).

use std::sync::atomic::Ordering;

use crate::board::search::{
    search, Outcome, Score, SearchLimits, Searcher, MATE_SCORE, MATE_THRESHOLD,
};
use crate::board::Position;
use crate::config::EngineOptions;

// ============================================================================
// Mates and terminal positions
// ============================================================================

#[test]
fn alphabeta_finds_mate_in_one() {
    // White to move, Qe8# is mate
    let pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/4Q2K w - - 0 1");
    let results = search(&pos, &SearchLimits::depth(2));

    assert_eq!(results.best_move.map(|mv| mv.to_string()).as_deref(), Some("e1e8"));
    assert_eq!(results.score, MATE_SCORE - 1);
    assert_eq!(results.score_view(), Score::Mate(1));
    assert!(results.is_mate());
}

#[test]
fn alphabeta_finds_mate_in_two() {
    // Ra7 then Rb8#
    let pos = Position::from_fen("6k1/8/8/8/8/8/R7/1R5K w - - 0 1");
    let results = search(&pos, &SearchLimits::depth(5));
    assert_eq!(results.score_view(), Score::Mate(2));
}

#[test]
fn proven_mate_stops_iterating() {
    let pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/4Q2K w - - 0 1");
    let results = search(&pos, &SearchLimits::depth(20));
    assert!(results.depth < 20, "searched to depth {}", results.depth);
    assert_eq!(results.score_view(), Score::Mate(1));
}

#[test]
fn checkmated_root_reports_outcome() {
    // Fool's mate: White is checkmated
    let pos = Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
    let results = search(&pos, &SearchLimits::depth(4));

    assert_eq!(results.best_move, None);
    assert_eq!(results.outcome, Some(Outcome::Checkmate));
    assert_eq!(results.score, -MATE_SCORE);
    assert_eq!(results.score_view(), Score::Mate(0));
    assert!(results.pv.is_empty());
}

#[test]
fn stalemated_root_reports_outcome() {
    let pos = Position::from_fen("k7/8/1QK5/8/8/8/8/8 b - - 0 1");
    let results = search(&pos, &SearchLimits::depth(4));

    assert_eq!(results.best_move, None);
    assert_eq!(results.outcome, Some(Outcome::Stalemate));
    assert_eq!(results.score, 0);
}

#[test]
fn mated_side_sees_negative_mate() {
    // Black to move; after any move White mates with Qe8 or Qa8
    let pos = Position::from_fen("7k/8/6K1/8/8/8/8/Q7 b - - 0 1");
    let results = search(&pos, &SearchLimits::depth(4));
    assert!(results.best_move.is_some());
    assert!(results.score <= -MATE_THRESHOLD, "score {}", results.score);
    assert!(matches!(results.score_view(), Score::Mate(n) if n < 0));
}

// ============================================================================
// Material and quiescence
// ============================================================================

#[test]
fn captures_hanging_queen() {
    let pos = Position::from_fen("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1");
    let results = search(&pos, &SearchLimits::depth(3));
    assert_eq!(results.best_move.map(|mv| mv.to_string()).as_deref(), Some("d2d5"));
    assert!(results.score > 300);
}

#[test]
fn quiescence_sees_recapture() {
    // Qxd5 wins a pawn but loses the queen to exd5
    let pos = Position::from_fen("4k3/8/4p3/3p4/8/8/8/3QK3 w - - 0 1");
    let results = search(&pos, &SearchLimits::depth(1));
    assert_ne!(results.best_move.map(|mv| mv.to_string()).as_deref(), Some("d1d5"));
    assert!(results.score > -300);
}

// ============================================================================
// Draws
// ============================================================================

#[test]
fn repeated_root_scores_draw() {
    let mut pos = Position::new();
    pos.apply_moves(&["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"])
        .unwrap();
    assert!(pos.is_draw());

    let results = search(&pos, &SearchLimits::depth(4));
    assert_eq!(results.score, 0);
    assert_eq!(results.depth, 0);
    assert!(results.best_move.is_some());
}

#[test]
fn fifty_move_root_scores_draw() {
    let pos = Position::from_fen("4k3/8/8/8/8/8/Q7/4K3 w - - 100 80");
    let results = search(&pos, &SearchLimits::depth(4));
    assert_eq!(results.score, 0);
    assert!(results.best_move.is_some());
}

#[test]
fn mate_on_hundredth_half_move_beats_fifty_move_draw() {
    // Qe8# is a quiet move that brings the clock to 100
    let pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/4Q2K w - - 99 80");
    let results = search(&pos, &SearchLimits::depth(3));
    assert_eq!(results.best_move.map(|mv| mv.to_string()).as_deref(), Some("e1e8"));
    assert_eq!(results.score_view(), Score::Mate(1));
}

#[test]
fn fifty_move_draw_below_the_root() {
    // Any quiet move reaches the clock limit, so no line is better than a draw
    let pos = Position::from_fen("4k3/8/8/8/8/8/Q7/4K3 w - - 99 80");
    let results = search(&pos, &SearchLimits::depth(3));
    assert_eq!(results.score, 0);
}

#[test]
fn insufficient_material_scores_draw() {
    let pos = Position::from_fen("4k3/8/8/8/8/8/8/4KN2 w - - 0 1");
    let results = search(&pos, &SearchLimits::depth(4));
    assert_eq!(results.score, 0);
}

#[test]
fn search_avoids_repetition_when_winning() {
    // White is a queen up; shuffling back into the twice-seen position
    // would be a draw.
    let mut pos = Position::from_fen("4k3/8/8/8/8/8/Q7/4K3 w - - 0 1");
    pos.apply_moves(&["a2b2", "e8d8", "b2a2", "d8e8", "a2b2", "e8d8"]).unwrap();
    let results = search(&pos, &SearchLimits::depth(4));
    assert_ne!(results.best_move.map(|mv| mv.to_string()).as_deref(), Some("b2a2"));
    assert!(results.score > 0);
}

// ============================================================================
// Results bookkeeping
// ============================================================================

#[test]
fn pv_is_legal_and_ponder_is_second_move() {
    let pos = Position::from_fen(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    );
    let results = search(&pos, &SearchLimits::depth(4));

    assert!(!results.pv.is_empty());
    assert_eq!(results.pv.first().copied(), results.best_move);
    assert_eq!(results.ponder_move, results.pv.get(1).copied());

    let mut walk = pos.clone();
    for &mv in &results.pv {
        assert!(walk.generate_moves().contains(mv), "{mv} illegal in PV");
        walk.make_move(mv);
    }
}

#[test]
fn iterations_are_recorded_in_order() {
    let results = search(&Position::new(), &SearchLimits::depth(4));
    let depths: Vec<u32> = results.iterations.iter().map(|it| it.depth).collect();
    assert_eq!(depths, vec![1, 2, 3, 4]);
    assert_eq!(results.depth, 4);
    assert!(results.seldepth >= results.depth);
    let last = results.iterations.last().unwrap();
    assert_eq!(last.best_move, results.best_move);
    assert!(results.iterations.windows(2).all(|w| w[0].nodes <= w[1].nodes));
}

#[test]
fn fixed_depth_search_is_deterministic() {
    let pos = Position::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");
    let a = search(&pos, &SearchLimits::depth(4));
    let b = search(&pos, &SearchLimits::depth(4));
    assert_eq!(a.best_move, b.best_move);
    assert_eq!(a.score, b.score);
    assert_eq!(a.nodes, b.nodes);
    assert_eq!(a.pv, b.pv);
}

#[test]
fn node_limit_is_respected() {
    let results = search(&Position::new(), &SearchLimits::nodes(500));
    assert!(results.nodes <= 500, "searched {} nodes", results.nodes);
    assert!(results.best_move.is_some());
}

#[test]
fn tiny_node_limit_falls_back_to_ordered_move() {
    let mut pos = Position::new();
    let results = search(&pos, &SearchLimits::nodes(1));
    assert_eq!(results.depth, 0);
    assert!(results.iterations.is_empty());
    let best = results.best_move.unwrap();
    assert!(pos.generate_moves().contains(best));
}

#[test]
fn preset_stop_flag_still_returns_a_move() {
    let mut searcher = Searcher::default();
    searcher.stop_flag().store(true, Ordering::Relaxed);
    let mut pos = Position::new();
    let results = searcher.run(&pos, &SearchLimits::depth(6));
    assert_eq!(results.depth, 0);
    assert!(pos.generate_moves().contains(results.best_move.unwrap()));
}

#[test]
fn search_moves_restrict_root() {
    let mut pos = Position::new();
    let a3 = pos.parse_move("a2a3").unwrap();
    let h3 = pos.parse_move("h2h3").unwrap();
    let results = search(&pos, &SearchLimits::depth(3).with_search_moves([a3, h3]));
    let best = results.best_move.unwrap();
    assert!(best == a3 || best == h3, "picked {best}");
}

#[test]
fn mate_score_is_stored_ply_adjusted() {
    let pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/4Q2K w - - 0 1");
    let mut searcher = Searcher::default();
    searcher.search(&pos, &SearchLimits::depth(2));

    let entry = searcher.tt().probe(pos.hash()).unwrap();
    assert_eq!(entry.score_at_ply(0), MATE_SCORE - 1);
    assert_eq!(entry.best_move().map(|mv| mv.to_string()).as_deref(), Some("e1e8"));
}

#[test]
fn null_move_can_be_disabled() {
    let pos = Position::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");
    let mut options = EngineOptions::default();
    options.params.null_move = false;
    let without = Searcher::new(options).search(&pos, &SearchLimits::depth(4));
    let with = search(&pos, &SearchLimits::depth(4));
    assert!(without.best_move.is_some());
    assert!(without.nodes >= with.nodes / 4);
}

#[test]
fn lazy_smp_returns_main_worker_result() {
    let pos = Position::from_fen("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1");
    let mut options = EngineOptions::default();
    options.threads = 3;
    let mut searcher = Searcher::new(options);
    let results = searcher.search(&pos, &SearchLimits::depth(4));

    assert_eq!(results.depth, 4);
    assert_eq!(results.best_move.map(|mv| mv.to_string()).as_deref(), Some("d2d5"));
    assert!(results.nodes >= results.iterations.last().unwrap().nodes);
}

#[test]
fn searcher_clear_forgets_table() {
    let pos = Position::new();
    let mut searcher = Searcher::default();
    searcher.search(&pos, &SearchLimits::depth(3));
    assert!(searcher.tt().probe(pos.hash()).is_some());
    searcher.clear();
    assert!(searcher.tt().probe(pos.hash()).is_none());
    assert!(searcher.latest().is_none());
}
