//! Coordinate transforms and packed chunk keys.
//!
//! Global cell coordinates are signed 64-bit; chunk coordinates are signed
//! 32-bit (the plane is unbounded in principle, 32-bit chunk space in
//! practice). The split uses arithmetic shift and mask rather than `/` and
//! `%` so negative coordinates floor toward the correct chunk: cell -1 lives
//! in chunk -1 at local offset 31, not in chunk 0.

use crate::chunk::CHUNK_SIZE;

/// log2 of the chunk edge.
pub const CHUNK_SHIFT: u32 = 5;

/// Low-bit mask extracting a local offset.
pub const CHUNK_MASK: i64 = (CHUNK_SIZE as i64) - 1;

/// Chunk coordinate pair packed into one `u64`: cx in the high 32 bits, cy
/// in the low 32. Cheaper to hash and compare than a `(i32, i32)` tuple key
/// and small enough to copy everywhere.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey(u64);

impl ChunkKey {
    #[inline]
    pub fn new(cx: i32, cy: i32) -> Self {
        Self(((cx as u32 as u64) << 32) | cy as u32 as u64)
    }

    #[inline]
    pub fn cx(self) -> i32 {
        (self.0 >> 32) as u32 as i32
    }

    #[inline]
    pub fn cy(self) -> i32 {
        self.0 as u32 as i32
    }

    /// Neighboring key at chunk offset `(dx, dy)`. Wrapping add keeps the
    /// packed representation total at the i32 edge.
    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.cx().wrapping_add(dx), self.cy().wrapping_add(dy))
    }

    /// Origin (in cells) of the top-left corner of this chunk.
    #[inline]
    pub fn cell_origin(self) -> (i64, i64) {
        (
            (self.cx() as i64) << CHUNK_SHIFT,
            (self.cy() as i64) << CHUNK_SHIFT,
        )
    }
}

impl std::fmt::Debug for ChunkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.cx(), self.cy())
    }
}

/// Split a global cell coordinate into `(key, lx, ly)`.
#[inline]
pub fn split_coord(x: i64, y: i64) -> (ChunkKey, usize, usize) {
    let key = ChunkKey::new((x >> CHUNK_SHIFT) as i32, (y >> CHUNK_SHIFT) as i32);
    (key, (x & CHUNK_MASK) as usize, (y & CHUNK_MASK) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_floors_negatives() {
        let (k, lx, ly) = split_coord(-1, -1);
        assert_eq!((k.cx(), k.cy()), (-1, -1));
        assert_eq!((lx, ly), (31, 31));

        let (k, lx, ly) = split_coord(-32, 0);
        assert_eq!((k.cx(), k.cy()), (-1, 0));
        assert_eq!((lx, ly), (0, 0));

        let (k, lx, ly) = split_coord(33, 33);
        assert_eq!((k.cx(), k.cy()), (1, 1));
        assert_eq!((lx, ly), (1, 1));
    }

    #[test]
    fn key_packs_and_unpacks() {
        for &(cx, cy) in &[(0, 0), (-1, 1), (i32::MIN, i32::MAX), (1234, -4321)] {
            let k = ChunkKey::new(cx, cy);
            assert_eq!(k.cx(), cx);
            assert_eq!(k.cy(), cy);
        }
        // Distinct coordinates must pack distinctly.
        assert_ne!(ChunkKey::new(0, 1), ChunkKey::new(1, 0));
    }

    #[test]
    fn cell_origin_matches_split() {
        let k = ChunkKey::new(-2, 3);
        assert_eq!(k.cell_origin(), (-64, 96));
        let (k2, _, _) = split_coord(-64, 96);
        assert_eq!(k, k2);
    }
}
