//! Special positions and edge cases.

use crate::board::{Color, Move, MoveList, Piece, Position, Square};

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

#[test]
fn test_stalemate_position() {
    let mut pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
    assert!(pos.generate_moves().is_empty());
    assert!(!pos.is_in_check(Color::Black));
    assert!(pos.is_stalemate());
}

#[test]
fn test_underpromotions() {
    for (text, piece) in [("a7a8n", Piece::Knight), ("a7a8r", Piece::Rook), ("a7a8b", Piece::Bishop)] {
        let mut pos = Position::from_fen("8/P7/8/8/8/8/8/K1k5 w - - 0 1");
        pos.make_move_str(text).unwrap();
        assert_eq!(pos.piece_at(sq("a8")), Some((Color::White, piece)));
    }
}

#[test]
fn test_en_passant_removes_correct_pawn() {
    let mut pos =
        Position::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 1");
    let mv = pos.parse_move("e5d6").unwrap();
    assert!(mv.is_en_passant());
    pos.make_move(mv);
    assert_eq!(pos.piece_at(sq("d5")), None);
    assert_eq!(pos.piece_at(sq("d6")), Some((Color::White, Piece::Pawn)));
    assert_eq!(pos.pieces(Color::Black, Piece::Pawn).popcount(), 7);
}

#[test]
fn test_castling_blocked_by_check() {
    let mut pos = Position::from_fen("r3k2r/8/8/8/4Q3/8/8/R3K2R b KQkq - 0 1");
    assert!(pos.is_in_check(Color::Black));
    assert!(pos.generate_moves().iter().all(|m| !m.is_castling()));
}

#[test]
fn test_castling_through_attacked_square() {
    let mut pos = Position::from_fen("r4rk1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
    let moves = pos.generate_moves();
    // f1 is covered by the f8 rook
    assert!(!moves.iter().any(|m| m.is_castle_kingside()));
    assert!(moves.iter().any(|m| m.is_castle_queenside()));
}

#[test]
fn test_castling_requires_rook_on_home_square() {
    // Castling rights claimed but the h1 rook is missing.
    let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w KQ - 0 1");
    let moves = pos.generate_moves();
    assert!(!moves.iter().any(|m| m.is_castle_kingside()));
    assert!(moves.iter().any(|m| m.is_castle_queenside()));
}

#[test]
fn test_double_check_only_king_can_move() {
    let mut pos = Position::from_fen("4k3/8/8/1b6/8/8/3r4/3K4 w - - 0 1");
    let moves = pos.generate_moves();
    assert!(!moves.is_empty());
    assert!(moves.iter().all(|m| m.from() == sq("d1")));
}

#[test]
fn test_checkmate_back_rank() {
    let mut pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
    pos.make_move_str("a1a8").unwrap();
    assert!(pos.is_checkmate());
}

#[test]
fn test_move_convenience_methods() {
    let quiet = Move::quiet(sq("g1"), sq("f3"));
    assert!(quiet.is_quiet() && !quiet.is_tactical());
    let promo = Move::new_promotion(sq("a7"), sq("a8"), Piece::Queen);
    assert!(promo.is_promotion() && promo.is_tactical() && !promo.is_capture());
    assert_eq!(format!("{promo}"), "a7a8q");
    assert_eq!(format!("{quiet:?}"), "Move(g1f3)");
}

#[test]
fn test_movelist_index() {
    let mut pos = Position::new();
    let moves: MoveList = pos.generate_moves();
    assert_eq!(moves[0], moves.first().unwrap());
    assert_eq!(moves.get(moves.len()), None);
}

#[test]
fn test_position_from_str() {
    let pos: Position = "8/8/8/8/8/8/8/K1k5 b - - 0 1".parse().unwrap();
    assert_eq!(pos.side_to_move(), Color::Black);
    assert!("not a fen".parse::<Position>().is_err());
}

#[test]
fn test_king_square_and_piece_queries() {
    let pos = Position::new();
    assert_eq!(pos.king_square(Color::White), Some(Square::E1));
    assert_eq!(pos.king_square(Color::Black), Some(Square::E8));
    assert_eq!(pos.piece_on(Square::D1), Some(Piece::Queen));
    assert_eq!(pos.occupied().popcount(), 32);
    assert!(pos.has_non_pawn_material(Color::White));
    let bare = Position::from_fen("4k3/pppp4/8/8/8/8/8/4K3 b - - 0 1");
    assert!(!bare.has_non_pawn_material(Color::Black));
}
