//! Search constants.

use crate::board::MAX_PLY;

/// Score of being mated at the root; mated at ply `n` scores `-MATE_SCORE + n`.
pub const MATE_SCORE: i32 = 32000;

/// Scores with absolute value >= this are mate scores
pub const MATE_THRESHOLD: i32 = MATE_SCORE - MAX_PLY as i32;

/// Window bound larger than any reachable score
pub const INFINITY: i32 = MATE_SCORE + 1;

pub const DRAW_SCORE: i32 = 0;

// ============================================================================
// MOVE ORDERING PRIORITIES
// ============================================================================
// Higher scores are tried earlier: TT move > captures > killers > quiet history.

/// Hash move (from transposition table)
pub const TT_MOVE_SCORE: i32 = 1 << 20;

/// Base for captures and promotions, above every killer
pub const CAPTURE_BASE_SCORE: i32 = 100_000;

/// Extra credit for a promotion, on top of any capture
pub const PROMOTION_BONUS: i32 = 50_000;

/// First killer move (quiet that caused beta cutoff at same ply)
pub const KILLER1_SCORE: i32 = 20000;

/// Second killer move (replaced killer)
pub const KILLER2_SCORE: i32 = 10000;

/// Quiet history scores are clamped below the killer scores
pub const HISTORY_MAX: i32 = KILLER2_SCORE - 1;
