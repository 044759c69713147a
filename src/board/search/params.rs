#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tunable search parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchParams {
    pub null_move: bool,
    /// Depth reduction of the null-move search, beyond the move itself
    pub null_reduction: u32,
    pub null_min_depth: u32,
    /// Half-width of the first aspiration window, in centipawns
    pub aspiration_delta: i32,
    pub aspiration_min_depth: u32,
    /// Maximum quiescence plies below the horizon
    pub qsearch_max_depth: usize,
    /// Nodes between clock and stop-flag polls
    pub check_interval: u64,
    /// History scores are shifted right by this much between searches
    pub history_decay_shift: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            null_move: true,
            null_reduction: 2,
            null_min_depth: 3,
            aspiration_delta: 50,
            aspiration_min_depth: 4,
            qsearch_max_depth: 16,
            check_interval: 1024,
            history_decay_shift: 2,
        }
    }
}
