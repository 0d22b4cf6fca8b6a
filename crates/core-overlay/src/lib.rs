//! Visual overlays tracked alongside the cell grid: per-cell age and a
//! per-cell activity heatmap.
//!
//! Both overlays mirror the chunk store's tiling (a byte tile per chunk
//! key, byte `ly * 32 + lx` for local `(lx, ly)`), so the projector can walk
//! them with the same viewport arithmetic it uses for cells. Both are purely
//! visual: history rewind does not restore them (they re-converge on the
//! next forward pass), and neither participates in the step computation.
//!
//! Age invariant: a byte is non-zero iff the paired cell bit is set. The
//! age store is rebuilt from the new generation every step, so tiles exist
//! exactly where live cells exist. Heat tiles instead accumulate and decay
//! in place; a tile is dropped when decay zeroes its last byte.

mod age;
mod heat;
mod tile;

pub use age::AgeTracker;
pub use heat::{DEFAULT_HEAT_BOOST, DEFAULT_HEAT_DECAY_INTERVAL, HeatTracker};
pub use tile::ByteTile;
