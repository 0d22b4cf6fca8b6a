//! Activity heatmap: where the grid has been changing recently.

use std::collections::{HashMap, HashSet};

use ahash::RandomState;
use core_grid::{CHUNK_SIZE, Chunk, ChunkKey, ChunkStore, split_coord};
use tracing::trace;

use crate::tile::ByteTile;

/// Counter boost per observed cell flip.
pub const DEFAULT_HEAT_BOOST: u8 = 5;

/// Steps between global decay passes.
pub const DEFAULT_HEAT_DECAY_INTERVAL: u32 = 10;

/// Activity overlay. Every flipped cell (alive→dead or dead→alive) bumps
/// its counter by `boost`, saturating at 255; every `decay_interval` steps
/// all positive counters lose 1 and exhausted tiles are dropped. Unlike the
/// age store the heat store persists across generations; heat outlives the
/// cells that generated it, which is the point.
#[derive(Debug, Clone)]
pub struct HeatTracker {
    tiles: HashMap<ChunkKey, Box<ByteTile>, RandomState>,
    boost: u8,
    decay_interval: u32,
    steps_since_decay: u32,
}

impl HeatTracker {
    pub fn new(boost: u8, decay_interval: u32) -> Self {
        Self {
            tiles: HashMap::default(),
            boost,
            decay_interval: decay_interval.max(1),
            steps_since_decay: 0,
        }
    }

    /// Record one generation transition: XOR the two stores row-by-row and
    /// bump every differing bit, then run the periodic decay.
    pub fn observe_step(&mut self, old: &ChunkStore, new: &ChunkStore) {
        let keys: HashSet<ChunkKey, RandomState> = old.keys().chain(new.keys()).collect();
        for key in keys {
            self.record_diff(key, old.chunk(key), new.chunk(key));
        }

        self.steps_since_decay += 1;
        if self.steps_since_decay >= self.decay_interval {
            self.steps_since_decay = 0;
            self.decay();
        }
    }

    fn record_diff(&mut self, key: ChunkKey, old: Option<&Chunk>, new: Option<&Chunk>) {
        for ly in 0..CHUNK_SIZE {
            let old_row = old.map_or(0, |c| c.row(ly));
            let new_row = new.map_or(0, |c| c.row(ly));
            let mut flipped = old_row ^ new_row;
            if flipped == 0 {
                continue;
            }
            let tile = self
                .tiles
                .entry(key)
                .or_insert_with(|| Box::new(ByteTile::new()));
            while flipped != 0 {
                let lx = flipped.trailing_zeros() as usize;
                tile.bump(lx, ly, self.boost);
                flipped &= flipped - 1;
            }
        }
    }

    /// Record a direct edit flip.
    pub fn note_edit(&mut self, x: i64, y: i64) {
        let (key, lx, ly) = split_coord(x, y);
        self.tiles
            .entry(key)
            .or_insert_with(|| Box::new(ByteTile::new()))
            .bump(lx, ly, self.boost);
    }

    fn decay(&mut self) {
        let before = self.tiles.len();
        self.tiles.retain(|_, tile| !tile.decay());
        if self.tiles.len() != before {
            trace!(
                target: "overlay.heat",
                dropped = before - self.tiles.len(),
                remaining = self.tiles.len(),
                "heat_decay_gc"
            );
        }
    }

    #[inline]
    pub fn tile(&self, key: ChunkKey) -> Option<&ByteTile> {
        self.tiles.get(&key).map(Box::as_ref)
    }

    pub fn heat_at(&self, x: i64, y: i64) -> u8 {
        let (key, lx, ly) = split_coord(x, y);
        self.tiles.get(&key).map_or(0, |t| t.get(lx, ly))
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }
}

impl Default for HeatTracker {
    fn default() -> Self {
        Self::new(DEFAULT_HEAT_BOOST, DEFAULT_HEAT_DECAY_INTERVAL)
    }
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
    fn flips_accumulate_boost() {
        let mut heat = HeatTracker::default();
        let empty = ChunkStore::new();
        let one = store_of(&[(4, 4)]);

        heat.observe_step(&empty, &one); // birth: one flip
        assert_eq!(heat.heat_at(4, 4), DEFAULT_HEAT_BOOST);
        heat.observe_step(&one, &empty); // death: another flip
        assert_eq!(heat.heat_at(4, 4), DEFAULT_HEAT_BOOST * 2);
        // Unchanged cells stay cold.
        assert_eq!(heat.heat_at(5, 4), 0);
    }

    #[test]
    fn boost_saturates() {
        let mut heat = HeatTracker::new(255, 1000);
        let empty = ChunkStore::new();
        let one = store_of(&[(0, 0)]);
        heat.observe_step(&empty, &one);
        heat.observe_step(&one, &empty);
        assert_eq!(heat.heat_at(0, 0), 255);
    }

    #[test]
    fn decay_runs_on_interval_and_drops_cold_tiles() {
        let mut heat = HeatTracker::new(1, 2);
        let empty = ChunkStore::new();
        let one = store_of(&[(9, 9)]);

        heat.observe_step(&empty, &one); // heat 1, step 1 of 2
        assert_eq!(heat.heat_at(9, 9), 1);
        heat.observe_step(&one, &one); // no flips; decay fires
        assert_eq!(heat.heat_at(9, 9), 0);
        assert_eq!(heat.tile_count(), 0, "exhausted tile dropped");
    }

    #[test]
    fn oscillator_keeps_its_halo_warm() {
        let mut heat = HeatTracker::default();
        let horizontal = store_of(&[(0, 0), (1, 0), (2, 0)]);
        let vertical = store_of(&[(1, -1), (1, 0), (1, 1)]);
        heat.observe_step(&horizontal, &vertical);
        // The center never flips; the wings do.
        assert_eq!(heat.heat_at(1, 0), 0);
        assert_eq!(heat.heat_at(0, 0), DEFAULT_HEAT_BOOST);
        assert_eq!(heat.heat_at(1, -1), DEFAULT_HEAT_BOOST);
    }
}
