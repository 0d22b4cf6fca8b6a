//! Flat packed-bitmap loading.

use core_grid::ChunkStore;

/// Build a chunk store from a dense row-major word bitmap: bit `c % 32` of
/// `data[r * ceil(w/32) + c/32]` is the cell at `(c, r)`, origin at global
/// `(0, 0)`. Callers translate beforehand if they want another placement.
/// Words beyond the last full column may carry garbage bits; they are
/// masked off. Missing words read as zero, so short buffers are tolerated.
pub fn load_packed(w: u32, h: u32, data: &[u32]) -> ChunkStore {
    let mut store = ChunkStore::new();
    if w == 0 || h == 0 {
        return store;
    }
    let stride = (w as usize).div_ceil(32);
    for r in 0..h as usize {
        for wi in 0..stride {
            let Some(&word) = data.get(r * stride + wi) else {
                continue;
            };
            let base = (wi * 32) as u32;
            let valid = (w - base.min(w)).min(32);
            if valid == 0 {
                continue;
            }
            let mut bits = word & (u32::MAX >> (32 - valid));
            while bits != 0 {
                let c = base + bits.trailing_zeros();
                store.set_cell(c as i64, r as i64, true);
                bits &= bits - 1;
            }
        }
    }
    store
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_bits_row_major() {
        // 40×2: stride 2. Row 0 has cells 0 and 33; row 1 has cell 39.
        let data = [0b1, 0b10, 0, 1 << 7];
        let store = load_packed(40, 2, &data);
        assert!(store.get_cell(0, 0));
        assert!(store.get_cell(33, 0));
        assert!(store.get_cell(39, 1));
        assert_eq!(store.population(), 3);
    }

    #[test]
    fn garbage_bits_past_width_are_masked() {
        // Width 4, but the word has bits set well past column 3.
        let store = load_packed(4, 1, &[0xffff_ffff]);
        assert_eq!(store.population(), 4);
        assert!(!store.get_cell(4, 0));
    }

    #[test]
    fn all_zero_bitmap_stores_no_chunks() {
        let store = load_packed(64, 64, &vec![0u32; 2 * 64]);
        assert_eq!(store.chunk_count(), 0);
        assert_eq!(store.population(), 0);
    }

    #[test]
    fn short_buffer_reads_missing_words_as_zero() {
        let store = load_packed(64, 2, &[u32::MAX]);
        assert_eq!(store.population(), 32);
    }

    #[test]
    fn packed_load_of_parsed_rle_matches_direct_placement() {
        let cells = crate::parse_rle("bo$2bo$3o!").unwrap();
        let (w, h) = (3u32, 3u32);

        // Pack the parsed cells into a dense bitmap...
        let stride = (w as usize).div_ceil(32);
        let mut data = vec![0u32; stride * h as usize];
        for &(x, y) in &cells {
            data[y as usize * stride + x as usize / 32] |= 1u32 << (x % 32) as u32;
        }
        let loaded = load_packed(w, h, &data);

        // ...and compare against placing the cells one by one.
        let mut direct = ChunkStore::new();
        for &(x, y) in &cells {
            direct.set_cell(x, y, true);
        }
        assert_eq!(loaded, direct);
        assert_eq!(loaded.population(), 5);
    }
}
