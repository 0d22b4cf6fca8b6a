//! Actual-FPS measurement for the run loop.

use std::time::{Duration, Instant};

/// Counts ticks over a rolling one-second window. `actual()` reports the
/// rate of the last completed window; until a first window completes it
/// reports zero (a freshly started loop has no measured rate yet).
#[derive(Debug, Clone)]
pub struct FpsMeter {
    window_start: Instant,
    frames_in_window: u32,
    actual: f64,
}

const WINDOW: Duration = Duration::from_secs(1);

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsMeter {
    pub fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames_in_window: 0,
            actual: 0.0,
        }
    }

    /// Record one frame.
    pub fn tick(&mut self) {
        self.frames_in_window += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed >= WINDOW {
            self.actual = self.frames_in_window as f64 / elapsed.as_secs_f64();
            self.frames_in_window = 0;
            self.window_start = Instant::now();
        }
    }

    /// Forget the current window (run loop stopped or restarted).
    pub fn reset(&mut self) {
        self.window_start = Instant::now();
        self.frames_in_window = 0;
        self.actual = 0.0;
    }

    pub fn actual(&self) -> f64 {
        self.actual
    }
}
