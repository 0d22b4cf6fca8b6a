//! Wire message types for the engine ↔ Presenter contract.
//!
//! Both directions use tagged messages of the shape `{type, payload}`;
//! the serde attributes on the enums below make that shape literal, so the
//! JSON encoding *is* the contract and nothing re-maps field names at the
//! transport layer. Unit variants carry no `payload` key at all.
//!
//! -------------------------------------------------------------------------
//! Channel Policy
//! -------------------------------------------------------------------------
//! Requests flow through a bounded channel sized by `REQUEST_CHANNEL_CAP`;
//! a Presenter that floods edits faster than the engine drains them blocks
//! at the send side rather than growing an unbounded queue. Updates flow
//! through an unbounded channel: the engine produces at most one frame per
//! handled message or run-loop tick (≤ 60 Hz), and the engine must never
//! stall on a slow Presenter mid-generation.
//! -------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

/// Bound for the Presenter→engine request channel.
pub const REQUEST_CHANNEL_CAP: usize = 1024;

/// One cell edit addressed by flat viewport index (`idx = row * w + col`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellEdit {
    pub idx: u64,
    pub val: u8,
}

/// A dense word-packed bitmap as shipped by the Presenter for `load`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedGrid {
    pub w: u32,
    pub h: u32,
    pub data: Vec<u32>,
    #[serde(default = "default_packed")]
    pub packed: bool,
}

fn default_packed() -> bool {
    true
}

/// Presenter → engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Request {
    /// Set viewport dimensions; seeds the default pattern into an empty
    /// world unless `preserve` is set.
    Init {
        cols: u32,
        rows: u32,
        #[serde(default)]
        preserve: bool,
    },
    /// Change viewport dimensions only.
    Resize { cols: u32, rows: u32 },
    /// Move the viewport origin to global `(x, y)`.
    ViewportMove { x: i64, y: i64 },
    Start,
    Stop,
    Step,
    Reverse,
    /// Target cadence in frames per second, fractional allowed, `(0, 60]`.
    SetFps(f64),
    SetHistory { enabled: bool, size: usize },
    SetAgeTracking(bool),
    SetHeatmap(bool),
    SetRule(String),
    SetCell { idx: u64, val: u8 },
    SetCells { updates: Vec<CellEdit> },
    Clear,
    /// Bernoulli density in `(0, 1)` over the viewport rectangle.
    Randomize(f64),
    Load(PackedGrid),
    Export,
    JumpToGen(u64),
}

/// Chunk-aligned world bounding box, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bbox {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

/// Actual vs requested cadence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FpsStats {
    pub actual: f64,
    pub target: f64,
}

/// Everything a Presenter needs to draw one frame. `grid` is the packed
/// viewport bitmap from `core-render`; `ages`/`heatmap` ride along only
/// while their overlays are enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub grid: Vec<u32>,
    pub generation: u64,
    pub pop: u64,
    pub running: bool,
    pub packed: bool,
    pub bbox: Option<Bbox>,
    pub rule: String,
    pub fps: FpsStats,
    pub chunks: usize,
    pub history_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ages: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heatmap: Option<Vec<u8>>,
}

/// Engine → Presenter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Update {
    /// Sent after any state change affecting what a frame should display.
    Update(Box<Frame>),
    ExportData { rle: String, w: u64, h: u64 },
    RuleChanged(String),
    RuleError(String),
    JumpProgress { current: u64, target: u64 },
    JumpComplete(u64),
    JumpError(String),
}
