//! Pattern interchange: RLE text, flat packed bitmaps, macrocell trees.
//!
//! All three loaders share one failure posture: they either produce a
//! complete result or return an error having touched nothing: the engine
//! applies a loaded pattern to its store only after parsing succeeds, so a
//! truncated or oversized file can never leave a half-loaded world behind.
//!
//! Size caps are deliberate and load-bearing: run lengths, total emitted
//! cells and macrocell node counts are all bounded so hostile input
//! degrades into an error instead of an allocation storm.

mod macrocell;
mod packed;
mod rle;

use thiserror::Error;

/// Emitted live cells are capped at this many coordinates.
pub const MAX_PATTERN_CELLS: usize = 10_000_000;

/// A single RLE run may not exceed this length.
pub const MAX_RUN_LENGTH: u64 = 100_000;

/// Macrocell files may not define more nodes than this.
pub const MAX_MACROCELL_NODES: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern exceeds size limits")]
    PatternTooLarge,
    #[error("invalid macrocell data: {0}")]
    InvalidMacrocell(String),
}

pub use macrocell::parse_macrocell;
pub use packed::load_packed;
pub use rle::{emit_rle, parse_rle};
