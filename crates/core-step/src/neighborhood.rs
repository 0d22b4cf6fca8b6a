//! The 3×3 chunk window around one stepping target.

use core_grid::{CHUNK_SIZE, Chunk, ChunkKey, ChunkStore};

/// Borrowed references to the center chunk and its eight neighbors, absent
/// tiles represented as `None` (all-zero). Gathered once per target chunk so
/// the row loop does no hash lookups.
pub(crate) struct Neighborhood<'a> {
    // Indexed [dy + 1][dx + 1]; grid[1][1] is the center.
    grid: [[Option<&'a Chunk>; 3]; 3],
}

impl<'a> Neighborhood<'a> {
    pub(crate) fn gather(store: &'a ChunkStore, center: ChunkKey) -> Self {
        let mut grid = [[None; 3]; 3];
        for (dy, row) in grid.iter_mut().enumerate() {
            for (dx, slot) in row.iter_mut().enumerate() {
                *slot = store.chunk(center.offset(dx as i32 - 1, dy as i32 - 1));
            }
        }
        Self { grid }
    }

    /// Words for logical row `y` of the center chunk, `y` in -1..=32.
    /// Returns `(west, center, east)` where a row outside 0..32 resolves
    /// into the vertically adjacent band (row -1 is the north chunks' row
    /// 31; row 32 is the south chunks' row 0).
    #[inline]
    pub(crate) fn row_words(&self, y: i32) -> (u32, u32, u32) {
        debug_assert!((-1..=CHUNK_SIZE as i32).contains(&y));
        let (band, ly) = if y < 0 {
            (0usize, CHUNK_SIZE - 1)
        } else if y >= CHUNK_SIZE as i32 {
            (2, 0)
        } else {
            (1, y as usize)
        };
        let word = |slot: Option<&Chunk>| slot.map_or(0, |c| c.row(ly));
        (
            word(self.grid[band][0]),
            word(self.grid[band][1]),
            word(self.grid[band][2]),
        )
    }
}
