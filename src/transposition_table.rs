use crate::{evaluation::Score, r#move::Move, zobrist::Hash};
use std::collections::TryReserveError;

/// How the stored score relates to the true value of the position.
/// Scores are White-positive, like everywhere in the search.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Bound {
    /// The score fell inside the window
    Exact,
    /// The true score is at least the stored one
    Lower,
    /// The true score is at most the stored one
    Upper,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct TranspositionEntry {
    pub hash: Hash,
    pub best_move: Option<Move>,
    pub depth: u8,
    pub score: Score,
    pub bound: Bound,
}

/// A fixed capacity cache of search results, indexed by `hash % capacity`.
///
/// Different positions share slots, so a probe only hits when the full hash
/// matches. Deeper results are preferred: a store into an occupied slot only
/// goes through when it was searched at least as deep.
pub struct TranspositionTable {
    slots: Vec<Option<TranspositionEntry>>,
}

impl TranspositionTable {
    pub fn new(capacity: usize) -> Self {
        TranspositionTable {
            slots: vec![None; capacity.max(1)],
        }
    }

    /// Table fitting in the given amount of memory
    pub fn with_megabytes(megabytes: usize) -> Self {
        Self::new(Self::capacity_for(megabytes))
    }

    fn capacity_for(megabytes: usize) -> usize {
        megabytes.saturating_mul(1024 * 1024) / std::mem::size_of::<Option<TranspositionEntry>>()
    }

    #[inline]
    fn index(&self, hash: Hash) -> usize {
        (hash % self.slots.len() as u64) as usize
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn probe(&self, hash: Hash) -> Option<TranspositionEntry> {
        self.slots[self.index(hash)].filter(|entry| entry.hash == hash)
    }

    pub fn store(&mut self, hash: Hash, best_move: Option<Move>, depth: u8, score: Score, bound: Bound) {
        let index = self.index(hash);
        let slot = &mut self.slots[index];
        if slot.map_or(true, |old| depth >= old.depth) {
            *slot = Some(TranspositionEntry {
                hash,
                best_move,
                depth,
                score,
                bound,
            })
        }
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None)
    }

    /// Reallocates the table, dropping every entry.
    /// The current table is kept when the new one cannot be allocated
    pub fn resize(&mut self, megabytes: usize) -> Result<(), TryReserveError> {
        let capacity = Self::capacity_for(megabytes).max(1);
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        slots.resize(capacity, None);
        self.slots = slots;
        Ok(())
    }

    /// Occupied slots per thousand, sampled over the first thousand slots
    pub fn hashfull(&self) -> usize {
        let sample = self.slots.len().min(1000);
        let used = self.slots[..sample].iter().filter(|s| s.is_some()).count();
        used * 1000 / sample
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::with_megabytes(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_requires_the_full_hash() {
        let mut tt = TranspositionTable::new(16);
        tt.store(3, Some(Move::new(12, 28)), 4, 35, Bound::Exact);
        assert_eq!(tt.probe(3).map(|e| e.score), Some(35));
        // 19 lands on the same slot
        assert_eq!(tt.probe(19), None);
        assert_eq!(tt.probe(4), None);
    }

    #[test]
    fn depth_preferred_replacement() {
        let mut tt = TranspositionTable::new(16);
        tt.store(5, None, 6, 10, Bound::Exact);
        // shallower result for a colliding position is dropped
        tt.store(21, None, 2, 20, Bound::Lower);
        assert_eq!(tt.probe(21), None);
        assert_eq!(tt.probe(5).map(|e| e.depth), Some(6));
        // equal depth replaces
        tt.store(21, None, 6, 20, Bound::Upper);
        assert_eq!(tt.probe(5), None);
        let entry = tt.probe(21).unwrap();
        assert_eq!((entry.score, entry.bound), (20, Bound::Upper));
    }

    #[test]
    fn collisions_never_leak_across_hashes() {
        let mut tt = TranspositionTable::new(7);
        for hash in 0..1000u64 {
            tt.store(hash.wrapping_mul(0x9E37_79B9_7F4A_7C15), None, (hash % 5) as u8, hash as Score, Bound::Exact);
        }
        for hash in 0..1000u64 {
            let key = hash.wrapping_mul(0x9E37_79B9_7F4A_7C15);
            if let Some(entry) = tt.probe(key) {
                assert_eq!(entry.hash, key);
                assert_eq!(entry.score, hash as Score);
            }
        }
    }

    #[test]
    fn clear_and_resize() {
        let mut tt = TranspositionTable::new(8);
        tt.store(1, None, 1, 0, Bound::Exact);
        tt.clear();
        assert_eq!(tt.probe(1), None);
        assert_eq!(tt.capacity(), 8);

        tt.resize(1).unwrap();
        assert_eq!(tt.capacity(), 1024 * 1024 / std::mem::size_of::<Option<TranspositionEntry>>());
        assert_eq!(tt.hashfull(), 0);
        tt.store(1, None, 1, 0, Bound::Exact);
        assert_eq!(tt.hashfull(), 1);
    }

    #[test]
    fn failed_resize_keeps_the_table() {
        let mut tt = TranspositionTable::new(8);
        tt.store(3, None, 2, 15, Bound::Exact);
        assert!(tt.resize(usize::MAX).is_err());
        assert_eq!(tt.capacity(), 8);
        assert_eq!(tt.probe(3).map(|e| e.score), Some(15));
    }
}
