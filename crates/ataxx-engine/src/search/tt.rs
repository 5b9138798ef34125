//! Transposition table: a direct-mapped, always-replace cache of search
//! results keyed by Zobrist hash.
//!
//! Unlike a lazy-SMP engine's table, this one is owned exclusively by the
//! single search worker thread — no atomics, no torn-write detection, no
//! generation counter. Just a plain array and a mask.

use ataxx_core::Move;

/// Bound type stored in a TT entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The stored score is exact (PV node).
    Exact,
    /// The stored score is a lower bound (failed high / beta cutoff).
    Lower,
    /// The stored score is an upper bound (failed low / all-node).
    Upper,
}

/// Scores at or beyond this distance from `mate_score` encode a forced mate
/// within the remaining search horizon and need ply-rebasing on TT I/O.
const MATE_REBASE_THRESHOLD: i32 = crate::search::MATE_SCORE - crate::search::MAX_DEPTH as i32;

/// Rebase a mate score from search-relative (distance from root) to
/// TT-relative (distance from this node), so the stored value doesn't
/// depend on how deep in the tree it was found.
pub fn eval_to_tt(score: i32, ply: u8) -> i16 {
    let rebased = if score >= MATE_REBASE_THRESHOLD {
        score + ply as i32
    } else if score <= -MATE_REBASE_THRESHOLD {
        score - ply as i32
    } else {
        score
    };
    rebased.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Reverse of [`eval_to_tt`]: rebase a stored score back to this node's ply.
pub fn eval_from_tt(score: i16, ply: u8) -> i32 {
    let score = score as i32;
    if score >= MATE_REBASE_THRESHOLD {
        score - ply as i32
    } else if score <= -MATE_REBASE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}

/// One cached search result.
#[derive(Debug, Clone, Copy)]
struct Entry {
    hash: u64,
    depth: i8,
    bound: Bound,
    score: i16,
    mv: Move,
}

const EMPTY: Entry = Entry { hash: 0, depth: -1, bound: Bound::Exact, mv: Move::NOMOVE, score: 0 };

/// Result of a successful probe, with the score already rebased to the
/// caller's ply.
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    pub depth: i8,
    pub bound: Bound,
    pub score: i32,
    pub mv: Move,
}

/// A direct-mapped, single-owner transposition table.
pub struct TranspositionTable {
    entries: Vec<Entry>,
    mask: usize,
}

/// Largest power of two that is `<= n` (for `n >= 1`).
fn round_down_to_power_of_two(n: usize) -> usize {
    if n.is_power_of_two() {
        n
    } else {
        n.next_power_of_two() >> 1
    }
}

impl TranspositionTable {
    /// Create a table sized to hold `mb` megabytes of entries, rounded down
    /// to a power of two for fast masking.
    pub fn new(mb: usize) -> Self {
        let bytes = mb * 1024 * 1024;
        let entry_size = std::mem::size_of::<Entry>();
        let num_entries = round_down_to_power_of_two((bytes / entry_size).max(1));
        TranspositionTable { entries: vec![EMPTY; num_entries], mask: num_entries - 1 }
    }

    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    /// Probe the table for `hash`. A `None` covers both a miss and a
    /// different hash occupying this slot.
    pub fn probe(&self, hash: u64, ply: u8) -> Option<Probe> {
        let entry = &self.entries[self.index(hash)];
        if entry.hash != hash || entry.depth < 0 {
            return None;
        }
        Some(Probe {
            depth: entry.depth,
            bound: entry.bound,
            score: eval_from_tt(entry.score, ply),
            mv: entry.mv,
        })
    }

    /// Store a result, unconditionally overwriting whatever was in the slot.
    pub fn store(&mut self, hash: u64, depth: i8, bound: Bound, score: i32, mv: Move, ply: u8) {
        let index = self.index(hash);
        self.entries[index] = Entry { hash, depth, bound, score: eval_to_tt(score, ply), mv };
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.fill(EMPTY);
    }

    /// Per-mille occupancy of the table, sampled over its first 1000 slots
    /// (or all slots, if the table is smaller than that).
    pub fn hashfull(&self) -> u32 {
        let sample = self.entries.len().min(1000);
        if sample == 0 {
            return 0;
        }
        let filled = self.entries[..sample].iter().filter(|e| e.depth >= 0).count();
        ((filled * 1000) / sample) as u32
    }
}
