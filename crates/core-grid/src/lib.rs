//! Sparse chunked bit-grid: the storage substrate for the engine.
//!
//! The plane is tiled into 32×32 chunks, each a `[u32; 32]` where word `ly`
//! holds row `ly` and bit `lx` (LSB = `lx = 0`) holds the cell at local
//! `(lx, ly)`. Chunks live in a hash map keyed by packed chunk coordinates;
//! only non-empty chunks are ever stored, so "does any chunk exist" doubles
//! as "is the world empty".
//!
//! Core invariants (must hold after every public call):
//! * Every stored chunk has at least one non-zero word.
//! * `population()` equals the sum of popcounts over all stored chunks.
//! * A dead write to a coordinate whose chunk is absent neither allocates
//!   nor marks anything dirty.
//! * The cached bounding box, once refreshed, covers every stored chunk.

mod chunk;
mod coords;
mod store;

pub use chunk::{CHUNK_AREA, CHUNK_SIZE, Chunk};
pub use coords::{CHUNK_MASK, CHUNK_SHIFT, ChunkKey, split_coord};
pub use store::{CellRect, ChunkStore};
