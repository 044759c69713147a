//! Transposition table for caching search results.
//!
//! One entry per bucket, indexed by the low bits of the position fingerprint.
//! The table is shared between search threads without locks: every slot is a
//! pair of `AtomicU64`s holding `key ^ data` and `data`. A reader that races
//! with a writer sees a key that no longer XORs back to its probe fingerprint
//! and treats the slot as a miss, so a torn entry is never trusted.

use std::mem;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use crate::board::search::constants::MATE_THRESHOLD;
use crate::board::Move;

/// Which side of the true value a stored score lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bound {
    /// The score is the exact value of the node.
    Exact,
    /// The search failed high: the value is at least the score.
    Lower,
    /// The search failed low: the value is at most the score.
    Upper,
}

impl Bound {
    // Never 0, so a packed entry is never all-zero and "empty" stays unambiguous.
    fn to_bits(self) -> u64 {
        match self {
            Bound::Exact => 1,
            Bound::Lower => 2,
            Bound::Upper => 3,
        }
    }

    fn from_bits(bits: u64) -> Self {
        match bits & 0x3 {
            2 => Bound::Lower,
            3 => Bound::Upper,
            _ => Bound::Exact,
        }
    }
}

/// Unpacked entry returned by [`TranspositionTable::probe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TTEntry {
    depth: u8,
    score: i16,
    bound: Bound,
    best_move: Option<Move>,
    generation: u8,
}

impl TTEntry {
    #[must_use]
    pub fn depth(&self) -> u32 {
        u32::from(self.depth)
    }

    /// Stored score. Mate scores are relative to the node that stored them;
    /// use [`TTEntry::score_at_ply`] to read them back at a given ply.
    #[must_use]
    pub fn score(&self) -> i32 {
        i32::from(self.score)
    }

    #[must_use]
    pub fn bound(&self) -> Bound {
        self.bound
    }

    #[must_use]
    pub fn best_move(&self) -> Option<Move> {
        self.best_move
    }

    #[must_use]
    pub fn generation(&self) -> u8 {
        self.generation
    }

    /// Stored score converted to be relative to the search root, for a node
    /// `ply` half-moves below it.
    #[must_use]
    pub fn score_at_ply(&self, ply: usize) -> i32 {
        score_from_tt(self.score(), ply)
    }

    /// Score that may replace searching the node, if the stored result is
    /// deep enough and its bound settles the window `(alpha, beta)`.
    ///
    /// An exact entry always settles it; a lower bound only when it is
    /// already `>= beta`; an upper bound only when it is already `<= alpha`.
    #[must_use]
    pub fn cutoff(&self, depth: u32, alpha: i32, beta: i32, ply: usize) -> Option<i32> {
        if self.depth() < depth {
            return None;
        }
        let score = self.score_at_ply(ply);
        match self.bound {
            Bound::Exact => Some(score),
            Bound::Lower if score >= beta => Some(score),
            Bound::Upper if score <= alpha => Some(score),
            _ => None,
        }
    }
}

/// Convert a root-relative score into the node-relative form stored in the table.
#[inline]
#[must_use]
pub fn score_to_tt(score: i32, ply: usize) -> i32 {
    let ply = ply as i32;
    if score >= MATE_THRESHOLD {
        score + ply
    } else if score <= -MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

/// Inverse of [`score_to_tt`].
#[inline]
#[must_use]
pub fn score_from_tt(score: i32, ply: usize) -> i32 {
    let ply = ply as i32;
    if score >= MATE_THRESHOLD {
        score - ply
    } else if score <= -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

/// Packed entry format (64 bits):
/// - bits 0-15:  move (0 = no move)
/// - bits 16-31: score (i16)
/// - bits 32-39: depth
/// - bits 40-41: bound (1..=3)
/// - bits 42-47: generation
fn pack_entry(depth: u8, score: i16, bound: Bound, best_move: Option<Move>, generation: u8) -> u64 {
    let mv = u64::from(best_move.map_or(0, Move::as_u16));
    mv | (u64::from(score as u16) << 16)
        | (u64::from(depth) << 32)
        | (bound.to_bits() << 40)
        | (u64::from(generation & GENERATION_MASK) << 42)
}

fn unpack_entry(data: u64) -> TTEntry {
    let mv = (data & 0xFFFF) as u16;
    TTEntry {
        depth: ((data >> 32) & 0xFF) as u8,
        score: ((data >> 16) & 0xFFFF) as u16 as i16,
        bound: Bound::from_bits(data >> 40),
        best_move: if mv == 0 { None } else { Some(Move::from_u16(mv)) },
        generation: ((data >> 42) & u64::from(GENERATION_MASK)) as u8,
    }
}

const GENERATION_MASK: u8 = 0x3F;
const MIN_SLOTS: usize = 1024;

struct TTSlot {
    /// fingerprint ^ data
    key_xor: AtomicU64,
    data: AtomicU64,
}

impl TTSlot {
    fn new() -> Self {
        TTSlot {
            key_xor: AtomicU64::new(0),
            data: AtomicU64::new(0),
        }
    }

    fn load(&self) -> (u64, u64) {
        let key_xor = self.key_xor.load(Ordering::Relaxed);
        let data = self.data.load(Ordering::Relaxed);
        (key_xor, data)
    }

    fn write(&self, hash: u64, data: u64) {
        self.data.store(data, Ordering::Relaxed);
        self.key_xor.store(hash ^ data, Ordering::Relaxed);
    }

    fn reset(&self) {
        self.key_xor.store(0, Ordering::Relaxed);
        self.data.store(0, Ordering::Relaxed);
    }
}

/// Thread-safe, fixed-capacity transposition table.
///
/// All methods take `&self`; share it between workers with `Arc`.
pub struct TranspositionTable {
    slots: Vec<TTSlot>,
    mask: usize,
    generation: AtomicU8,
}

impl TranspositionTable {
    /// Allocate a table of at most `size_mb` MiB (rounded down to a power of
    /// two number of slots, never fewer than 1024).
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let slots = Self::slot_count(size_mb);
        log::trace!(
            "allocating transposition table: {} slots ({} MiB)",
            slots,
            (slots * mem::size_of::<TTSlot>()) >> 20
        );
        TranspositionTable {
            slots: (0..slots).map(|_| TTSlot::new()).collect(),
            mask: slots - 1,
            generation: AtomicU8::new(0),
        }
    }

    fn slot_count(size_mb: usize) -> usize {
        let bytes = size_mb.saturating_mul(1024 * 1024);
        let slots = bytes / mem::size_of::<TTSlot>();
        if slots < MIN_SLOTS {
            MIN_SLOTS
        } else if slots.is_power_of_two() {
            slots
        } else {
            slots.next_power_of_two() / 2
        }
    }

    /// Reallocate to `size_mb`, discarding every entry.
    pub fn resize(&mut self, size_mb: usize) {
        *self = TranspositionTable::new(size_mb);
    }

    /// Number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn slot(&self, hash: u64) -> &TTSlot {
        &self.slots[(hash as usize) & self.mask]
    }

    /// Current search generation.
    #[must_use]
    pub fn generation(&self) -> u8 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Start a new top-level search: entries from earlier searches become
    /// preferred replacement victims.
    pub fn new_search(&self) {
        let next = self.generation().wrapping_add(1) & GENERATION_MASK;
        self.generation.store(next, Ordering::Relaxed);
    }

    /// Entry stored for exactly this fingerprint, if any.
    #[must_use]
    pub fn probe(&self, hash: u64) -> Option<TTEntry> {
        let (key_xor, data) = self.slot(hash).load();
        if data != 0 && key_xor ^ data == hash {
            Some(unpack_entry(data))
        } else {
            None
        }
    }

    /// Store a search result, subject to the replacement policy:
    ///
    /// - an empty slot is always filled;
    /// - the same position is overwritten when the new search is at least as
    ///   deep or the old entry is from an earlier search, keeping the old best
    ///   move if the new result has none;
    /// - a different position is evicted only when it is from an earlier
    ///   search or strictly shallower. Ties keep the resident entry.
    ///
    /// `score` must already be in table form (see [`score_to_tt`]).
    pub fn store(&self, hash: u64, depth: u32, score: i32, bound: Bound, best_move: Option<Move>) {
        let generation = self.generation();
        let slot = self.slot(hash);
        let (key_xor, data) = slot.load();

        let mut best_move = best_move;
        if data != 0 {
            let resident = unpack_entry(data);
            let same_position = key_xor ^ data == hash;
            let stale = resident.generation != generation;
            let replace = if same_position {
                stale || depth >= resident.depth()
            } else {
                stale || depth > resident.depth()
            };
            if !replace {
                return;
            }
            if same_position && best_move.is_none() {
                best_move = resident.best_move;
            }
        }

        let depth = depth.min(u32::from(u8::MAX)) as u8;
        let score = score.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
        slot.write(hash, pack_entry(depth, score, bound, best_move, generation));
    }

    /// Fill rate in per mille, sampled over the first 1000 slots.
    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        let sample = self.slots.len().min(1000);
        let used = self.slots[..sample]
            .iter()
            .filter(|slot| slot.data.load(Ordering::Relaxed) != 0)
            .count();
        ((used * 1000) / sample) as u32
    }

    /// Empty every slot and reset the generation.
    pub fn clear(&self) {
        log::trace!("clearing transposition table ({} slots)", self.slots.len());
        for slot in &self.slots {
            slot.reset();
        }
        self.generation.store(0, Ordering::Relaxed);
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        TranspositionTable::new(16)
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("capacity", &self.capacity())
            .field("generation", &self.generation())
            .finish()
    }
}
