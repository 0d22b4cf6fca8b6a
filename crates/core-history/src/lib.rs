//! Reverse-in-time support: a bounded ring of per-generation deltas.
//!
//! Rather than snapshotting the whole store per generation, each entry keeps
//! only the chunks that changed: a map from chunk key to `(before, after)`
//! where either side may be "absent". Memory is
//! proportional to change, not to population: a still-life field of a
//! million cells with one active corner records one small delta per step.
//!
//! Entries hold cloned tiles, never references into the live store, so
//! rewinding can never corrupt (or be corrupted by) subsequent forward
//! mutation. A generation that changes nothing pushes no entry.
//!
//! Ring discipline: bounded capacity in `RING_MIN..=RING_MAX`, oldest entry
//! dropped on overflow, newest popped by `reverse`. Disabling history is
//! the caller's concern (drop the ring); re-enabling starts fresh.

use std::collections::HashMap;

use ahash::RandomState;
use core_grid::{Chunk, ChunkKey, ChunkStore};
use tracing::trace;

/// Smallest configurable ring capacity.
pub const RING_MIN: usize = 5;
/// Largest configurable ring capacity.
pub const RING_MAX: usize = 100;
/// Capacity used when the Presenter never configures one.
pub const RING_DEFAULT: usize = 20;

/// One generation's worth of reversible change.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub pre_generation: u64,
    pub pre_population: u64,
    delta: HashMap<ChunkKey, (Option<Chunk>, Option<Chunk>), RandomState>,
}

impl HistoryEntry {
    /// Diff two stores. Returns `None` when nothing changed.
    fn diff(
        old: &ChunkStore,
        new: &ChunkStore,
        pre_generation: u64,
        pre_population: u64,
    ) -> Option<Self> {
        let mut delta: HashMap<ChunkKey, (Option<Chunk>, Option<Chunk>), RandomState> =
            HashMap::default();
        for (key, old_chunk) in old.iter() {
            match new.chunk(key) {
                Some(new_chunk) if new_chunk == old_chunk => {}
                other => {
                    delta.insert(key, (Some(*old_chunk), other.copied()));
                }
            }
        }
        for (key, new_chunk) in new.iter() {
            if old.chunk(key).is_none() {
                delta.insert(key, (None, Some(*new_chunk)));
            }
        }
        if delta.is_empty() {
            return None;
        }
        Some(Self {
            pre_generation,
            pre_population,
            delta,
        })
    }

    /// Number of chunks this entry touches.
    pub fn touched_chunks(&self) -> usize {
        self.delta.len()
    }

    /// Put the "before" side of every delta entry back into `store`.
    pub fn rewind(&self, store: &mut ChunkStore) {
        for (&key, (pre, _)) in &self.delta {
            match pre {
                Some(chunk) => store.insert_chunk(key, *chunk),
                None => store.remove_chunk(key),
            }
        }
        store.mark_bounds_dirty();
    }
}

/// Bounded FIFO of history entries; newest last.
#[derive(Debug, Default, Clone)]
pub struct HistoryRing {
    entries: std::collections::VecDeque<HistoryEntry>,
    capacity: usize,
}

impl HistoryRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: std::collections::VecDeque::new(),
            capacity: capacity.clamp(RING_MIN, RING_MAX),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Re-size in place, discarding oldest entries if shrinking.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.clamp(RING_MIN, RING_MAX);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Record the transition `old → new`. No-op when the stores are equal.
    pub fn capture(
        &mut self,
        old: &ChunkStore,
        new: &ChunkStore,
        pre_generation: u64,
        pre_population: u64,
    ) {
        let Some(entry) = HistoryEntry::diff(old, new, pre_generation, pre_population) else {
            return;
        };
        trace!(
            target: "history",
            depth = self.entries.len() + 1,
            touched = entry.touched_chunks(),
            pre_generation,
            "capture"
        );
        self.entries.push_back(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
            trace!(target: "history", "ring_trimmed");
        }
    }

    /// Take the newest entry for the caller to apply.
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        let entry = self.entries.pop_back();
        if let Some(e) = &entry {
            trace!(
                target: "history",
                depth = self.entries.len(),
                pre_generation = e.pre_generation,
                "pop"
            );
        }
        entry
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Debug aid: every stored delta really differs on both sides.
    #[cfg(debug_assertions)]
    pub fn verify_deltas(&self) -> bool {
        self.entries.iter().all(|e| {
            e.delta
                .values()
                .all(|(pre, post)| pre != post)
        })
    }
}

/// Convenience for tests and the engine's equality checks: live cells of a
/// store as a sorted set.
#[cfg(test)]
fn cells(store: &ChunkStore) -> std::collections::BTreeSet<(i64, i64)> {
    let mut out = std::collections::BTreeSet::new();
    for (key, chunk) in store.iter() {
        let (ox, oy) = key.cell_origin();
        chunk.for_each_live(|lx, ly| {
            out.insert((ox + lx as i64, oy + ly as i64));
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_of(cells: &[(i64, i64)]) -> ChunkStore {
        let mut s = ChunkStore::new();
        for &(x, y) in cells {
            s.set_cell(x, y, true);
        }
        s
    }

    #[test]
    fn capture_then_rewind_restores_exactly() {
        let old = store_of(&[(0, 0), (1, 0), (2, 0)]);
        let new = store_of(&[(1, -1), (1, 0), (1, 1)]);

        let mut ring = HistoryRing::new(RING_DEFAULT);
        ring.capture(&old, &new, 7, 3);
        assert_eq!(ring.len(), 1);
        assert!(ring.verify_deltas());

        let mut live = new.clone();
        let entry = ring.pop().unwrap();
        assert_eq!(entry.pre_generation, 7);
        assert_eq!(entry.pre_population, 3);
        entry.rewind(&mut live);
        assert_eq!(cells(&live), cells(&old));
        assert_eq!(live.population(), old.population());
    }

    #[test]
    fn unchanged_generation_pushes_nothing() {
        let block = store_of(&[(0, 0), (1, 0), (0, 1), (1, 1)]);
        let mut ring = HistoryRing::new(RING_DEFAULT);
        ring.capture(&block, &block.clone(), 1, 4);
        assert!(ring.is_empty());
    }

    #[test]
    fn rewind_deletes_chunks_born_in_the_step() {
        let old = store_of(&[(0, 0)]);
        // New generation grew into a distant chunk.
        let new = store_of(&[(0, 0), (100, 100)]);
        let mut ring = HistoryRing::new(RING_DEFAULT);
        ring.capture(&old, &new, 0, 1);

        let mut live = new;
        ring.pop().unwrap().rewind(&mut live);
        assert_eq!(live.chunk_count(), 1);
        assert!(!live.get_cell(100, 100));
    }

    #[test]
    fn ring_drops_oldest_beyond_capacity() {
        let mut ring = HistoryRing::new(RING_MIN);
        let empty = ChunkStore::new();
        for g in 0..10u64 {
            let single = store_of(&[(g as i64, 0)]);
            ring.capture(&empty, &single, g, 0);
        }
        assert_eq!(ring.len(), RING_MIN);
        // Newest-first popping yields generations 9, 8, ...
        assert_eq!(ring.pop().unwrap().pre_generation, 9);
        assert_eq!(ring.pop().unwrap().pre_generation, 8);
    }

    #[test]
    fn capacity_is_clamped() {
        assert_eq!(HistoryRing::new(0).capacity(), RING_MIN);
        assert_eq!(HistoryRing::new(1000).capacity(), RING_MAX);
        let mut ring = HistoryRing::new(50);
        ring.set_capacity(2);
        assert_eq!(ring.capacity(), RING_MIN);
    }
}
