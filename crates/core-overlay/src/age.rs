//! Per-cell age: generations survived, saturating at 255.

use std::collections::HashMap;

use ahash::RandomState;
use core_grid::{ChunkKey, ChunkStore, split_coord};

use crate::tile::ByteTile;

/// Age overlay. Rebuilt from scratch every generation: each live cell in
/// the new store carries `min(previous_age + 1, 255)`, so a newborn reads 1
/// and dead cells carry no byte at all.
#[derive(Debug, Default, Clone)]
pub struct AgeTracker {
    tiles: HashMap<ChunkKey, Box<ByteTile>, RandomState>,
}

impl AgeTracker {
    /// Tracker for a world that already has live cells: everything alive
    /// starts at age 1, as if just born.
    pub fn seeded(store: &ChunkStore) -> Self {
        let mut tracker = Self::default();
        for (key, chunk) in store.iter() {
            let mut tile = Box::new(ByteTile::new());
            chunk.for_each_live(|lx, ly| tile.set(lx, ly, 1));
            tracker.tiles.insert(key, tile);
        }
        tracker
    }

    /// Age store for the next generation. Reads `self` (the previous ages),
    /// writes a fresh store keyed by the new generation's live cells.
    pub fn advance(&self, new_store: &ChunkStore) -> Self {
        let mut next = Self::default();
        for (key, chunk) in new_store.iter() {
            let old_tile = self.tiles.get(&key);
            let mut tile = Box::new(ByteTile::new());
            chunk.for_each_live(|lx, ly| {
                let old = old_tile.map_or(0, |t| t.get(lx, ly));
                tile.set(lx, ly, old.saturating_add(1));
            });
            next.tiles.insert(key, tile);
        }
        next
    }

    /// Keep the age byte in lockstep with a direct cell edit: newborn paint
    /// reads age 1, erasure clears the byte (and drops an emptied tile).
    pub fn note_edit(&mut self, x: i64, y: i64, alive: bool) {
        let (key, lx, ly) = split_coord(x, y);
        if alive {
            self.tiles
                .entry(key)
                .or_insert_with(|| Box::new(ByteTile::new()))
                .set(lx, ly, 1);
        } else if let Some(tile) = self.tiles.get_mut(&key) {
            tile.set(lx, ly, 0);
            if tile.is_zero() {
                self.tiles.remove(&key);
            }
        }
    }

    #[inline]
    pub fn tile(&self, key: ChunkKey) -> Option<&ByteTile> {
        self.tiles.get(&key).map(Box::as_ref)
    }

    pub fn age_at(&self, x: i64, y: i64) -> u8 {
        let (key, lx, ly) = split_coord(x, y);
        self.tiles.get(&key).map_or(0, |t| t.get(lx, ly))
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Age invariant check: non-zero byte exactly where a cell is set.
    #[cfg(debug_assertions)]
    pub fn consistent_with(&self, store: &ChunkStore) -> bool {
        use core_grid::CHUNK_SIZE;
        for (key, tile) in &self.tiles {
            let chunk = store.chunk(*key);
            for ly in 0..CHUNK_SIZE {
                for lx in 0..CHUNK_SIZE {
                    let live = chunk.is_some_and(|c| c.get(lx, ly));
                    if live != (tile.get(lx, ly) != 0) {
                        return false;
                    }
                }
            }
        }
        // Tiles must also exist wherever cells do.
        store.iter().all(|(key, chunk)| {
            self.tiles.contains_key(&key) || chunk.is_empty()
        })
    }
}
