//! Engine state and its primitive operations.
//!
//! All simulation state is one owned value (store + overlays + history +
//! rule + viewport + counters); there is no module-level state anywhere in
//! the workspace. The request dispatcher in `dispatch.rs` is the only
//! public mutation surface beyond construction.

use core_events::{Bbox, Frame, FpsStats, Update};
use core_grid::ChunkStore;
use core_history::{HistoryRing, RING_DEFAULT};
use core_overlay::{AgeTracker, DEFAULT_HEAT_BOOST, DEFAULT_HEAT_DECAY_INTERVAL, HeatTracker};
use core_render::{Viewport, project_cells, project_overlay};
use core_rule::Rule;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::fps::FpsMeter;

/// Pattern seeded by `init` into an empty world: the Gosper glider gun,
/// centered in the viewport. Gives a fresh session something alive to
/// watch immediately.
pub(crate) const DEFAULT_PATTERN_RLE: &str = "24bo$22bobo$12b2o6b2o12b2o$11bo3bo4b2o12b2o\
$2o8bo5bo3b2o$2o8bo3bob2o4bobo$10bo5bo7bo$11bo3bo$12b2o!";

/// Startup knobs, typically derived from `petri.toml`.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub rule: Rule,
    pub target_fps: f64,
    pub history_enabled: bool,
    pub history_size: usize,
    pub heat_boost: u8,
    pub heat_decay_interval: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            rule: Rule::default(),
            target_fps: 10.0,
            history_enabled: true,
            history_size: RING_DEFAULT,
            heat_boost: DEFAULT_HEAT_BOOST,
            heat_decay_interval: DEFAULT_HEAT_DECAY_INTERVAL,
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &core_config::Config) -> Self {
        let rule = match Rule::parse(&config.file.engine.rule) {
            Ok(rule) => rule,
            Err(e) => {
                warn!(target: "engine", error = %e, "configured rule invalid, using default");
                Rule::default()
            }
        };
        Self {
            rule,
            target_fps: config.effective_fps,
            history_enabled: config.file.history.enabled,
            history_size: config.effective_history_size,
            heat_boost: config.file.overlay.heatmap_boost,
            heat_decay_interval: config.file.overlay.heatmap_decay_interval,
        }
    }
}

/// The simulation core. See the crate docs for the threading model.
pub struct Engine {
    pub(crate) store: ChunkStore,
    pub(crate) rule: Rule,
    pub(crate) generation: u64,
    pub(crate) viewport: Viewport,
    pub(crate) running: bool,
    pub(crate) target_fps: f64,
    pub(crate) meter: FpsMeter,
    pub(crate) next_tick: Option<Instant>,
    pub(crate) history_enabled: bool,
    pub(crate) history: HistoryRing,
    pub(crate) ages: Option<AgeTracker>,
    pub(crate) heat: Option<HeatTracker>,
    pub(crate) heat_boost: u8,
    pub(crate) heat_decay_interval: u32,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl Engine {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            store: ChunkStore::new(),
            rule: settings.rule,
            generation: 0,
            viewport: Viewport::new(0, 0, 0, 0),
            running: false,
            target_fps: settings.target_fps,
            meter: FpsMeter::new(),
            next_tick: None,
            history_enabled: settings.history_enabled,
            history: HistoryRing::new(settings.history_size),
            ages: None,
            heat: None,
            heat_boost: settings.heat_boost,
            heat_decay_interval: settings.heat_decay_interval,
        }
    }

    // --- accessors used by the service loop and tests ---------------------

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn population(&self) -> u64 {
        self.store.population()
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Deadline of the next run-loop tick. Only meaningful while running.
    pub fn next_tick_deadline(&self) -> Option<Instant> {
        self.next_tick
    }

    pub(crate) fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps)
    }

    // --- run loop ---------------------------------------------------------

    pub(crate) fn start_running(&mut self) {
        if !self.running {
            self.running = true;
            self.meter.reset();
            self.next_tick = Some(Instant::now());
        }
    }

    /// Halt the run loop and dequeue the pending tick.
    pub(crate) fn stop_running(&mut self) {
        self.running = false;
        self.next_tick = None;
    }

    /// One scheduled run-loop tick: advance, reschedule, emit a frame.
    pub fn tick(&mut self) -> Vec<Update> {
        if !self.running {
            return Vec::new();
        }
        self.advance_generation();
        self.meter.tick();
        // Self-correcting cadence: schedule relative to the previous
        // deadline, clamped so an overrun doesn't queue a tick burst.
        let now = Instant::now();
        let next = self.next_tick.unwrap_or(now) + self.tick_period();
        self.next_tick = Some(next.max(now));
        vec![self.frame()]
    }

    // --- generation stepping ----------------------------------------------

    /// Advance one generation: step, feed overlays old+new, capture the
    /// history delta, install the new store.
    pub(crate) fn advance_generation(&mut self) {
        let new_store = core_step::step(&self.store, &self.rule);
        if let Some(ages) = &self.ages {
            self.ages = Some(ages.advance(&new_store));
        }
        if let Some(heat) = &mut self.heat {
            heat.observe_step(&self.store, &new_store);
        }
        if self.history_enabled {
            self.history.capture(
                &self.store,
                &new_store,
                self.generation,
                self.store.population(),
            );
        }
        self.store = new_store;
        self.generation += 1;
    }

    /// Silent step for `jumpToGen`: no overlays, no history, no frame.
    pub(crate) fn advance_generation_silent(&mut self) {
        self.store = core_step::step(&self.store, &self.rule);
        self.generation += 1;
    }

    /// Undo the newest captured generation. False when history is disabled
    /// or exhausted.
    pub(crate) fn reverse(&mut self) -> bool {
        if !self.history_enabled {
            return false;
        }
        let Some(entry) = self.history.pop() else {
            return false;
        };
        entry.rewind(&mut self.store);
        self.generation = entry.pre_generation;
        debug_assert_eq!(
            self.store.population(),
            entry.pre_population,
            "rewound store must reproduce the recorded population"
        );
        debug!(target: "engine", generation = self.generation, "reversed");
        true
    }

    // --- edits ------------------------------------------------------------

    /// Apply one viewport-indexed edit. Out-of-viewport indices are
    /// unrepresentable by contract; a stray one is dropped with a warning.
    pub(crate) fn apply_edit(&mut self, idx: u64, val: u8) {
        if !self.viewport.contains_index(idx) {
            warn!(target: "engine", idx, "edit index outside viewport, dropped");
            return;
        }
        let (x, y) = self.viewport.index_to_global(idx);
        let alive = val != 0;
        if !self.store.set_cell(x, y, alive) {
            return; // no flip: overlays unchanged
        }
        if let Some(ages) = &mut self.ages {
            ages.note_edit(x, y, alive);
        }
        if let Some(heat) = &mut self.heat {
            heat.note_edit(x, y);
        }
    }

    // --- bulk state replacement -------------------------------------------

    /// Swap in a freshly built store, dropping history and re-deriving
    /// overlays (live cells start at age 1, heat starts cold).
    pub(crate) fn replace_store(&mut self, store: ChunkStore, reset_generation: bool) {
        self.store = store;
        self.store.mark_bounds_dirty();
        if reset_generation {
            self.generation = 0;
        }
        self.history.clear();
        self.reseed_overlays();
    }

    pub(crate) fn reseed_overlays(&mut self) {
        if self.ages.is_some() {
            self.ages = Some(AgeTracker::seeded(&self.store));
        }
        if self.heat.is_some() {
            self.heat = Some(HeatTracker::new(self.heat_boost, self.heat_decay_interval));
        }
    }

    /// Seed the default pattern centered in the viewport.
    pub(crate) fn seed_default_pattern(&mut self) {
        let cells = core_pattern::parse_rle(DEFAULT_PATTERN_RLE)
            .expect("built-in pattern parses");
        let (mut max_x, mut max_y) = (0i64, 0i64);
        for &(x, y) in &cells {
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        let ox = self.viewport.x + (self.viewport.w as i64 - (max_x + 1)) / 2;
        let oy = self.viewport.y + (self.viewport.h as i64 - (max_y + 1)) / 2;
        for (x, y) in cells {
            self.store.set_cell(ox + x, oy + y, true);
        }
        self.reseed_overlays();
        debug!(target: "engine", pop = self.store.population(), "seeded default pattern");
    }

    // --- output -----------------------------------------------------------

    /// Render the current state into an `update` message. Buffers are
    /// freshly allocated here and handed off wholesale; nothing retains
    /// them engine-side.
    pub(crate) fn frame(&mut self) -> Update {
        let grid = project_cells(&self.store, self.viewport);
        let ages = self
            .ages
            .as_ref()
            .map(|a| project_overlay(a, self.viewport));
        let heatmap = self
            .heat
            .as_ref()
            .map(|h| project_overlay(h, self.viewport));
        let bbox = self.store.bounding_box().map(|r| Bbox {
            x: r.x,
            y: r.y,
            w: r.w,
            h: r.h,
        });
        Update::Update(Box::new(Frame {
            grid,
            generation: self.generation,
            pop: self.store.population(),
            running: self.running,
            packed: true,
            bbox,
            rule: self.rule.canonical_string(),
            fps: FpsStats {
                actual: self.meter.actual(),
                target: self.target_fps,
            },
            chunks: self.store.chunk_count(),
            history_size: self.history.len(),
            ages,
            heatmap,
        }))
    }

    /// All live cells as global coordinates (export path).
    pub(crate) fn live_cells(&self) -> Vec<(i64, i64)> {
        let mut out = Vec::with_capacity(self.store.population() as usize);
        for (key, chunk) in self.store.iter() {
            let (ox, oy) = key.cell_origin();
            chunk.for_each_live(|lx, ly| out.push((ox + lx as i64, oy + ly as i64)));
        }
        out
    }
}
