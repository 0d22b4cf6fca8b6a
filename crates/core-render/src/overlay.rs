//! Overlay projection into flat byte arrays.

use core_grid::{CHUNK_SIZE, ChunkKey};
use core_overlay::{AgeTracker, ByteTile, HeatTracker};

use crate::viewport::Viewport;

/// Anything that can hand out byte tiles by chunk key. The projector is
/// written against this seam so age and heat (and any future byte overlay)
/// share one code path.
pub trait TileSource {
    fn tile(&self, key: ChunkKey) -> Option<&ByteTile>;
}

impl TileSource for AgeTracker {
    fn tile(&self, key: ChunkKey) -> Option<&ByteTile> {
        AgeTracker::tile(self, key)
    }
}

impl TileSource for HeatTracker {
    fn tile(&self, key: ChunkKey) -> Option<&ByteTile> {
        HeatTracker::tile(self, key)
    }
}

/// Project an overlay into a fresh `w × h` byte array, row-major, one byte
/// per viewport cell. Missing tiles read as zero.
pub fn project_overlay(source: &impl TileSource, vp: Viewport) -> Vec<u8> {
    let Some((cx_range, cy_range)) = vp.chunk_range() else {
        return Vec::new();
    };
    let width = vp.w as usize;
    let mut out = vec![0u8; vp.area()];

    let view_x1 = vp.x + vp.w as i64;
    let view_y1 = vp.y + vp.h as i64;
    let cs = CHUNK_SIZE as i64;

    for cy in cy_range {
        for cx in cx_range.clone() {
            let key = ChunkKey::new(cx, cy);
            let Some(tile) = source.tile(key) else {
                continue;
            };
            let (ox, oy) = key.cell_origin();
            let x0 = vp.x.max(ox);
            let x1 = view_x1.min(ox + cs);
            let y0 = vp.y.max(oy);
            let y1 = view_y1.min(oy + cs);

            let src_x0 = (x0 - ox) as usize;
            let src_x1 = (x1 - ox) as usize;
            for gy in y0..y1 {
                let src_row = tile.row((gy - oy) as usize);
                let dest_start = (gy - vp.y) as usize * width + (x0 - vp.x) as usize;
                out[dest_start..dest_start + (src_x1 - src_x0)]
                    .copy_from_slice(&src_row[src_x0..src_x1]);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_grid::ChunkStore;

    #[test]
    fn ages_project_to_matching_positions() {
        let mut store = ChunkStore::new();
        for &(x, y) in &[(0, 0), (-1, -1), (33, 2)] {
            store.set_cell(x, y, true);
        }
        let ages = AgeTracker::seeded(&store);

        let vp = Viewport::new(-2, -2, 40, 8);
        let out = project_overlay(&ages, vp);
        assert_eq!(out.len(), vp.area());
        let at = |dx: usize, dy: usize| out[dy * vp.w as usize + dx];
        assert_eq!(at(2, 2), 1); // (0, 0)
        assert_eq!(at(1, 1), 1); // (-1, -1)
        assert_eq!(at(35, 4), 1); // (33, 2)
        assert_eq!(at(0, 0), 0);
    }

    #[test]
    fn zero_area_viewport_is_empty() {
        let ages = AgeTracker::default();
        assert!(project_overlay(&ages, Viewport::new(0, 0, 0, 4)).is_empty());
    }

    #[test]
    fn heat_tiles_project_through_same_path() {
        let mut heat = HeatTracker::default();
        heat.note_edit(10, 10);
        let vp = Viewport::new(8, 8, 8, 8);
        let out = project_overlay(&heat, vp);
        assert_eq!(out[2 * 8 + 2], core_overlay::DEFAULT_HEAT_BOOST);
        assert_eq!(out.iter().filter(|&&b| b != 0).count(), 1);
    }
}
