use super::{Move, Position};

impl Position {
    /// Count the leaf nodes of the legal move tree `depth` plies deep.
    pub fn perft(&mut self, depth: usize) -> u64 {
        if depth == 0 {
            return 1;
        }

        let moves = self.generate_moves();
        if depth == 1 {
            return moves.len() as u64;
        }

        let mut nodes = 0;
        for mv in moves {
            let info = self.make_move(mv);
            nodes += self.perft(depth - 1);
            self.unmake_move(mv, info);
        }
        nodes
    }

    /// Perft split by root move, in generation order.
    pub fn perft_divide(&mut self, depth: usize) -> Vec<(Move, u64)> {
        if depth == 0 {
            return Vec::new();
        }
        let moves = self.generate_moves();
        let mut counts = Vec::with_capacity(moves.len());
        for mv in moves {
            let info = self.make_move(mv);
            counts.push((mv, self.perft(depth - 1)));
            self.unmake_move(mv, info);
        }
        counts
    }
}
