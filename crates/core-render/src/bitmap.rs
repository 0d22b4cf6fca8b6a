//! Cell-plane projection into a packed word bitmap.

use core_grid::{CHUNK_SIZE, ChunkKey, ChunkStore};

use crate::viewport::Viewport;

/// Render the viewport into a fresh row-major bitmap of
/// `stride × h` words. Absent chunks contribute zeros implicitly; only the
/// stored chunks intersecting the window are visited.
pub fn project_cells(store: &ChunkStore, vp: Viewport) -> Vec<u32> {
    let Some((cx_range, cy_range)) = vp.chunk_range() else {
        return Vec::new();
    };
    let stride = vp.stride();
    let mut out = vec![0u32; stride * vp.h as usize];

    let view_x1 = vp.x + vp.w as i64;
    let view_y1 = vp.y + vp.h as i64;
    let cs = CHUNK_SIZE as i64;

    for cy in cy_range {
        for cx in cx_range.clone() {
            let key = ChunkKey::new(cx, cy);
            let Some(chunk) = store.chunk(key) else {
                continue;
            };
            let (ox, oy) = key.cell_origin();

            // Intersection of this chunk's rectangle with the viewport.
            let x0 = vp.x.max(ox);
            let x1 = view_x1.min(ox + cs);
            let y0 = vp.y.max(oy);
            let y1 = view_y1.min(oy + cs);

            let src_bit = (x0 - ox) as u32;
            let bit_count = (x1 - x0) as u32;
            let run_mask = u32::MAX >> (32 - bit_count);

            for gy in y0..y1 {
                let word = chunk.row((gy - oy) as usize);
                let run = (word >> src_bit) & run_mask;
                if run == 0 {
                    continue;
                }
                let dest_row = (gy - vp.y) as usize;
                let dest_x = (x0 - vp.x) as usize;
                let dest_word = dest_row * stride + dest_x / 32;
                // Widen before shifting: a run landing near a word edge
                // spills its high bits into the next word.
                let placed = (run as u64) << (dest_x % 32);
                out[dest_word] |= placed as u32;
                let spill = (placed >> 32) as u32;
                if spill != 0 {
                    out[dest_word + 1] |= spill;
                }
            }
        }
    }
    out
}
