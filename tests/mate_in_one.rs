use serde::Deserialize;

use alphadeep::{search, Position, Score, SearchLimits};

#[derive(Deserialize)]
struct ProblemSet {
    problems: Vec<Problem>,
}

#[derive(Deserialize)]
struct Problem {
    #[serde(rename = "type")]
    kind: String,
    fen: String,
    moves: String,
}

fn load_problems() -> ProblemSet {
    let data = include_str!("data/problems.json");
    serde_json::from_str(data).expect("invalid problems.json")
}

/// The solution line as long-algebraic moves.
fn solution_moves(moves: &str) -> Vec<String> {
    moves.split(';').map(|mv| mv.replace('-', "")).collect()
}

fn mate_length(kind: &str) -> Option<i32> {
    match kind {
        "Mate in One" => Some(1),
        "Mate in Two" => Some(2),
        "Mate in Three" => Some(3),
        _ => None,
    }
}

#[test]
fn mate_in_one_suite() {
    let set = load_problems();

    for problem in set.problems.iter().filter(|p| p.kind == "Mate in One") {
        let mut pos = Position::from_fen(&problem.fen);
        pos.apply_moves(&solution_moves(&problem.moves))
            .unwrap_or_else(|err| panic!("bad solution for {}: {err}", problem.fen));

        assert!(
            pos.is_checkmate(),
            "mate in one failed for fen: {} move: {}",
            problem.fen,
            problem.moves
        );
    }
}

#[test]
fn mate_search_suite() {
    let set = load_problems();
    let mut failures = 0;

    for problem in &set.problems {
        let Some(moves) = mate_length(&problem.kind) else {
            continue;
        };
        let depth = 2 * moves as u32;

        let pos = Position::from_fen(&problem.fen);
        let results = search(&pos, &SearchLimits::depth(depth));

        if results.score_view() != Score::Mate(moves) {
            failures += 1;
            eprintln!(
                "Mismatch: type={} fen={} score={} best={:?}",
                problem.kind,
                problem.fen,
                results.score_view(),
                results.best_move.map(|mv| mv.to_string())
            );
            continue;
        }

        if moves == 1 {
            let mut after = pos.clone();
            let Some(best) = results.best_move else {
                failures += 1;
                eprintln!("Mismatch: type={} fen={} no move", problem.kind, problem.fen);
                continue;
            };
            after.make_move(best);
            if !after.is_checkmate() {
                failures += 1;
                eprintln!(
                    "Mismatch: type={} fen={} move={} not checkmate",
                    problem.kind, problem.fen, best
                );
            }
        }
    }

    assert_eq!(failures, 0, "mate search mismatches: {}", failures);
}
