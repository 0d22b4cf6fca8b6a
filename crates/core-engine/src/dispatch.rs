//! Request dispatcher: applies one Presenter message to the engine and
//! returns the updates it produced, in emission order.
//!
//! Contract notes, mirrored from the wire documentation:
//! * Explicit `step`, `reverse`, `clear`, `randomize`, `load` and
//!   `jumpToGen` implicitly stop the run loop first.
//! * Recoverable failures (bad rule, oversized pattern, backward jump)
//!   change nothing and surface as their error update.
//! * `reverse` with no history is a silent no-op: not an error, no frame.

use core_events::{Request, Update};
use core_history::HistoryRing;
use core_overlay::{AgeTracker, HeatTracker};
use core_pattern::{emit_rle, load_packed};
use core_rule::Rule;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::engine::Engine;
use crate::error::EngineError;

/// Generations between `jumpProgress` emissions.
const JUMP_PROGRESS_INTERVAL: u64 = 1000;

impl Engine {
    /// Handle one request to completion. Never yields; never retries.
    pub fn handle(&mut self, request: Request) -> Vec<Update> {
        match request {
            Request::Init {
                cols,
                rows,
                preserve,
            } => {
                self.viewport.w = cols;
                self.viewport.h = rows;
                if self.store.is_empty() && !preserve {
                    self.seed_default_pattern();
                }
                info!(target: "engine", cols, rows, preserve, "init");
                vec![self.frame()]
            }
            Request::Resize { cols, rows } => {
                self.viewport.w = cols;
                self.viewport.h = rows;
                vec![self.frame()]
            }
            Request::ViewportMove { x, y } => {
                self.viewport.x = x;
                self.viewport.y = y;
                vec![self.frame()]
            }
            Request::Start => {
                self.start_running();
                vec![self.frame()]
            }
            Request::Stop => {
                self.stop_running();
                vec![self.frame()]
            }
            Request::Step => {
                self.stop_running();
                self.advance_generation();
                vec![self.frame()]
            }
            Request::Reverse => {
                self.stop_running();
                if self.reverse() {
                    vec![self.frame()]
                } else {
                    Vec::new() // exhausted or disabled: silent no-op
                }
            }
            Request::SetFps(fps) => {
                if fps.is_finite() && fps > 0.0 {
                    self.target_fps = fps.min(60.0);
                    // Re-anchor the cadence if the loop is mid-flight.
                    if self.running {
                        self.next_tick = Some(std::time::Instant::now() + self.tick_period());
                    }
                } else {
                    warn!(target: "engine", fps, "rejected non-positive fps");
                }
                vec![self.frame()]
            }
            Request::SetHistory { enabled, size } => {
                if enabled {
                    if !self.history_enabled {
                        // Re-enabling starts fresh.
                        self.history = HistoryRing::new(size);
                    } else {
                        self.history.set_capacity(size);
                    }
                    self.history_enabled = true;
                } else {
                    self.history_enabled = false;
                    self.history.clear();
                }
                vec![self.frame()]
            }
            Request::SetAgeTracking(enabled) => {
                self.ages = enabled.then(|| AgeTracker::seeded(&self.store));
                vec![self.frame()]
            }
            Request::SetHeatmap(enabled) => {
                self.heat =
                    enabled.then(|| HeatTracker::new(self.heat_boost, self.heat_decay_interval));
                vec![self.frame()]
            }
            Request::SetRule(text) => match Rule::parse(&text) {
                Ok(rule) => {
                    self.rule = rule;
                    info!(target: "engine", rule = %rule.canonical_string(), "rule changed");
                    vec![
                        Update::RuleChanged(rule.canonical_string()),
                        self.frame(),
                    ]
                }
                Err(e) => {
                    debug!(target: "engine", input = %text, "rule rejected");
                    vec![Update::RuleError(e.to_string())]
                }
            },
            Request::SetCell { idx, val } => {
                self.apply_edit(idx, val);
                vec![self.frame()]
            }
            Request::SetCells { updates } => {
                for edit in updates {
                    self.apply_edit(edit.idx, edit.val);
                }
                vec![self.frame()]
            }
            Request::Clear => {
                self.stop_running();
                self.store.clear();
                self.generation = 0;
                self.history.clear();
                self.reseed_overlays();
                vec![self.frame()]
            }
            Request::Randomize(density) => {
                self.stop_running();
                self.randomize_viewport(density);
                vec![self.frame()]
            }
            Request::Load(grid) => {
                self.stop_running();
                let store = load_packed(grid.w, grid.h, &grid.data);
                info!(target: "engine", w = grid.w, h = grid.h, pop = store.population(), "loaded packed bitmap");
                self.replace_store(store, true);
                vec![self.frame()]
            }
            Request::Export => {
                let cells = self.live_cells();
                let (w, h) = pattern_extent(&cells);
                let rle = emit_rle(&cells, &self.rule.canonical_string());
                vec![Update::ExportData { rle, w, h }]
            }
            Request::JumpToGen(target) => {
                self.stop_running();
                self.jump_to_generation(target)
            }
        }
    }

    /// Replace the viewport rectangle with Bernoulli(`density`) cells.
    /// Cells outside the viewport are untouched; overlays and history are
    /// wiped (the past no longer explains the present).
    fn randomize_viewport(&mut self, density: f64) {
        let density = density.clamp(0.0, 1.0);
        let mut rng = rand::rng();
        let vp = self.viewport;
        for dy in 0..vp.h as i64 {
            for dx in 0..vp.w as i64 {
                let alive = rng.random::<f64>() < density;
                self.store.set_cell(vp.x + dx, vp.y + dy, alive);
            }
        }
        self.history.clear();
        self.reseed_overlays();
        self.store.mark_bounds_dirty();
    }

    /// Advance silently to `target`, emitting coarse progress. A jump is
    /// not interruptible; the Presenter only sees the pings.
    fn jump_to_generation(&mut self, target: u64) -> Vec<Update> {
        if target <= self.generation {
            let err = EngineError::CannotJumpBackward {
                target,
                current: self.generation,
            };
            return vec![Update::JumpError(err.to_string())];
        }
        let mut updates = Vec::new();
        let mut since_progress = 0u64;
        while self.generation < target {
            self.advance_generation_silent();
            since_progress += 1;
            if since_progress == JUMP_PROGRESS_INTERVAL {
                since_progress = 0;
                updates.push(Update::JumpProgress {
                    current: self.generation,
                    target,
                });
            }
        }
        // Overlays were not maintained across the jump; re-derive them so
        // the age invariant holds for the world we land in.
        self.reseed_overlays();
        info!(target: "engine.jump", generation = self.generation, "jump complete");
        updates.push(Update::JumpComplete(self.generation));
        updates.push(self.frame());
        updates
    }
}

/// Tight width/height of a cell set (0×0 when empty).
fn pattern_extent(cells: &[(i64, i64)]) -> (u64, u64) {
    let Some(&(x0, y0)) = cells.first() else {
        return (0, 0);
    };
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (x0, x0, y0, y0);
    for &(x, y) in cells {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    ((max_x - min_x + 1) as u64, (max_y - min_y + 1) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::Frame;
    use core_pattern::parse_rle;

    fn frame_of(updates: &[Update]) -> &Frame {
        updates
            .iter()
            .find_map(|u| match u {
                Update::Update(frame) => Some(frame.as_ref()),
                _ => None,
            })
            .expect("expected a frame update")
    }

    #[test]
    fn init_seeds_default_pattern_once() {
        let mut engine = Engine::default();
        let updates = engine.handle(Request::Init {
            cols: 60,
            rows: 40,
            preserve: false,
        });
        let frame = frame_of(&updates);
        assert_eq!(frame.pop, 36, "Gosper gun has 36 cells");
        assert_eq!(frame.generation, 0);

        // A second init with preserve keeps the world.
        let updates = engine.handle(Request::Init {
            cols: 80,
            rows: 50,
            preserve: true,
        });
        assert_eq!(frame_of(&updates).pop, 36);
    }

    #[test]
    fn set_rule_reports_and_applies() {
        let mut engine = Engine::default();
        let updates = engine.handle(Request::SetRule("b63/s32".into()));
        assert!(matches!(&updates[0], Update::RuleChanged(s) if s == "B36/S23"));
        assert_eq!(frame_of(&updates).rule, "B36/S23");
    }

    #[test]
    fn bad_rule_leaves_engine_untouched() {
        let mut engine = Engine::default();
        engine.handle(Request::SetRule("B36/S23".into()));
        let updates = engine.handle(Request::SetRule("what".into()));
        assert_eq!(updates.len(), 1);
        assert!(matches!(&updates[0], Update::RuleError(_)));
        let updates = engine.handle(Request::Step);
        assert_eq!(frame_of(&updates).rule, "B36/S23", "rule kept");
    }

    #[test]
    fn step_and_jump_stop_the_run_loop() {
        let mut engine = Engine::default();
        engine.handle(Request::Start);
        assert!(engine.is_running());
        engine.handle(Request::Step);
        assert!(!engine.is_running());

        engine.handle(Request::Start);
        engine.handle(Request::JumpToGen(engine.generation() + 5));
        assert!(!engine.is_running());
    }

    #[test]
    fn backward_jump_is_an_error_and_a_noop() {
        let mut engine = Engine::default();
        engine.handle(Request::Step);
        engine.handle(Request::Step);
        let updates = engine.handle(Request::JumpToGen(1));
        assert_eq!(updates.len(), 1);
        assert!(matches!(&updates[0], Update::JumpError(_)));
        assert_eq!(engine.generation(), 2);
    }

    #[test]
    fn jump_emits_progress_and_completion() {
        let mut engine = Engine::default();
        let updates = engine.handle(Request::JumpToGen(2500));
        let progress: Vec<_> = updates
            .iter()
            .filter(|u| matches!(u, Update::JumpProgress { .. }))
            .collect();
        assert_eq!(progress.len(), 2, "pings at 1000 and 2000");
        assert!(matches!(updates[updates.len() - 2], Update::JumpComplete(2500)));
        assert_eq!(frame_of(&updates).generation, 2500);
    }

    #[test]
    fn export_round_trips_through_parser() {
        let mut engine = Engine::default();
        // A blinker away from the origin.
        engine.handle(Request::Init {
            cols: 10,
            rows: 10,
            preserve: true,
        });
        for idx in [11u64, 12, 13] {
            engine.handle(Request::SetCell { idx, val: 1 });
        }
        let updates = engine.handle(Request::Export);
        let Update::ExportData { rle, w, h } = &updates[0] else {
            panic!("expected exportData");
        };
        assert_eq!((*w, *h), (3, 1));
        assert_eq!(parse_rle(rle).unwrap().len(), 3);
    }

    #[test]
    fn randomize_replaces_only_the_viewport_rect() {
        let mut engine = Engine::default();
        engine.handle(Request::Init {
            cols: 8,
            rows: 8,
            preserve: true,
        });
        // A cell outside the viewport must survive randomize.
        engine.store.set_cell(100, 100, true);
        engine.handle(Request::Randomize(1.0));
        assert!(engine.store.get_cell(100, 100));
        // Density 1.0 fills the whole viewport.
        assert_eq!(engine.population(), 8 * 8 + 1);
        // Density 0.0 empties it again.
        engine.handle(Request::Randomize(0.0));
        assert_eq!(engine.population(), 1);
    }

    #[test]
    fn set_cells_applies_bulk_edits() {
        let mut engine = Engine::default();
        engine.handle(Request::Init {
            cols: 4,
            rows: 4,
            preserve: true,
        });
        let updates = engine.handle(Request::SetCells {
            updates: vec![
                core_events::CellEdit { idx: 0, val: 1 },
                core_events::CellEdit { idx: 5, val: 1 },
                core_events::CellEdit { idx: 99, val: 1 }, // out of viewport: dropped
            ],
        });
        assert_eq!(frame_of(&updates).pop, 2);
    }
}
