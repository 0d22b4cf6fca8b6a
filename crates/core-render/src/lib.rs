//! Viewport projection: lifting a window of the infinite plane into dense
//! output buffers for the Presenter.
//!
//! Two output shapes, both freshly allocated per call (the buffers are
//! moved to the Presenter and must never be reused):
//! * cells → a packed row-major `u32` bitmap, `ceil(w/32)` words per row,
//!   bit `destX % 32` of word `destX / 32`;
//! * overlays → a flat `u8` array, one byte per viewport cell.
//!
//! The cell path never walks individual bits: each chunk row contributes a
//! sub-run of up to 32 bits extracted with one shift+mask, widened to `u64`
//! and OR-ed across the (at most two) destination words it lands in. A
//! viewport with zero width or height projects to a zero-length buffer.

mod bitmap;
mod overlay;
mod viewport;

pub use bitmap::project_cells;
pub use overlay::{TileSource, project_overlay};
pub use viewport::Viewport;
