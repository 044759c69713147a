//! Board module tests.
//!
//! Tests are organized into separate files by category:
//! - `perft.rs` - Performance tests for move generation
//! - `draw.rs` - Draw detection (50-move, repetition, insufficient material)
//! - `make_unmake.rs` - Make/unmake move correctness
//! - `edge_cases.rs` - Special positions and edge cases
//! - `search.rs` - Search results, limits and draw scoring
//! - `proptest.rs` - Property-based tests

mod edge_cases;
mod perft;
mod proptest;
mod search;
