//! The sparse chunk store.
//!
//! A hash map from packed chunk key to tile, plus two derived quantities the
//! engine reads constantly: an incrementally maintained population counter
//! and a lazily refreshed chunk-aligned bounding box. The bounding box only
//! grows stale, never wrong-silently: every structural mutation sets a dirty
//! flag and the next `bounding_box` call rescans keys.
//!
//! Garbage collection is eager on the edit path (clearing the last live bit
//! of a tile removes the tile) and by-construction on the step path (the
//! generator never inserts an all-zero output chunk).

use std::collections::HashMap;

use ahash::RandomState;
use tracing::trace;

use crate::chunk::Chunk;
use crate::coords::{ChunkKey, split_coord};

/// Cell-space rectangle, chunk aligned, as handed to the Presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

#[derive(Clone, Debug, Default)]
struct BoundsCache {
    dirty: bool,
    rect: Option<(i32, i32, i32, i32)>, // min_cx, max_cx, min_cy, max_cy
}

/// Sparse mapping from chunk coordinate to 32×32 tile.
#[derive(Clone, Debug, Default)]
pub struct ChunkStore {
    chunks: HashMap<ChunkKey, Chunk, RandomState>,
    population: u64,
    bounds: BoundsCache,
}

impl PartialEq for ChunkStore {
    /// Stores compare by content only; cached bounds are presentation state.
    fn eq(&self, other: &Self) -> bool {
        self.chunks == other.chunks
    }
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get_cell(&self, x: i64, y: i64) -> bool {
        let (key, lx, ly) = split_coord(x, y);
        self.chunks.get(&key).is_some_and(|c| c.get(lx, ly))
    }

    /// Write one cell. Returns true when the cell actually changed state.
    ///
    /// A dead write to an absent chunk is a no-op and does not allocate. A
    /// write that clears the last live bit of a tile removes the tile.
    pub fn set_cell(&mut self, x: i64, y: i64, alive: bool) -> bool {
        let (key, lx, ly) = split_coord(x, y);
        match self.chunks.get_mut(&key) {
            Some(chunk) => {
                if !chunk.set(lx, ly, alive) {
                    return false;
                }
                if alive {
                    self.population += 1;
                } else {
                    self.population -= 1;
                    if chunk.is_empty() {
                        self.chunks.remove(&key);
                        self.bounds.dirty = true;
                        trace!(target: "grid", ?key, "chunk_gc");
                    }
                }
                true
            }
            None => {
                if !alive {
                    return false;
                }
                let mut chunk = Chunk::new();
                chunk.set(lx, ly, true);
                self.chunks.insert(key, chunk);
                self.population += 1;
                self.bounds.dirty = true;
                true
            }
        }
    }

    #[inline]
    pub fn chunk(&self, key: ChunkKey) -> Option<&Chunk> {
        self.chunks.get(&key)
    }

    /// Insert a pre-built tile, replacing any existing one at `key`.
    /// The tile must be non-empty (store invariant).
    pub fn insert_chunk(&mut self, key: ChunkKey, chunk: Chunk) {
        debug_assert!(!chunk.is_empty(), "empty chunk must never be stored");
        let pop = chunk.population();
        if let Some(old) = self.chunks.insert(key, chunk) {
            self.population -= old.population();
        }
        self.population += pop;
        self.bounds.dirty = true;
    }

    /// Remove the tile at `key` if present.
    pub fn remove_chunk(&mut self, key: ChunkKey) {
        if let Some(old) = self.chunks.remove(&key) {
            self.population -= old.population();
            self.bounds.dirty = true;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChunkKey, &Chunk)> {
        self.chunks.iter().map(|(&k, c)| (k, c))
    }

    pub fn keys(&self) -> impl Iterator<Item = ChunkKey> + '_ {
        self.chunks.keys().copied()
    }

    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    #[inline]
    pub fn population(&self) -> u64 {
        self.population
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.population = 0;
        self.bounds = BoundsCache::default();
    }

    /// Force the next `bounding_box` call to rescan. Used after bulk
    /// operations that bypass `set_cell` (history restore, store swap).
    pub fn mark_bounds_dirty(&mut self) {
        self.bounds.dirty = true;
    }

    /// Chunk-aligned bounding rectangle of all stored chunks, in cells.
    /// Refreshes the cache when stale; `None` for an empty store.
    pub fn bounding_box(&mut self) -> Option<CellRect> {
        if self.bounds.dirty || (self.bounds.rect.is_none() && !self.chunks.is_empty()) {
            self.bounds.rect = self.scan_bounds();
            self.bounds.dirty = false;
        }
        if self.chunks.is_empty() {
            return None;
        }
        self.bounds.rect.map(|(min_cx, max_cx, min_cy, max_cy)| {
            let cs = crate::chunk::CHUNK_SIZE as i64;
            CellRect {
                x: min_cx as i64 * cs,
                y: min_cy as i64 * cs,
                w: (max_cx as i64 - min_cx as i64 + 1) * cs,
                h: (max_cy as i64 - min_cy as i64 + 1) * cs,
            }
        })
    }

    fn scan_bounds(&self) -> Option<(i32, i32, i32, i32)> {
        let mut it = self.chunks.keys();
        let first = it.next()?;
        let mut rect = (first.cx(), first.cx(), first.cy(), first.cy());
        for key in it {
            rect.0 = rect.0.min(key.cx());
            rect.1 = rect.1.max(key.cx());
            rect.2 = rect.2.min(key.cy());
            rect.3 = rect.3.max(key.cy());
        }
        Some(rect)
    }

    /// Debug-only consistency check: recount population from scratch.
    #[cfg(debug_assertions)]
    pub fn verify_population(&self) -> bool {
        self.chunks.values().map(Chunk::population).sum::<u64>() == self.population
    }
}
