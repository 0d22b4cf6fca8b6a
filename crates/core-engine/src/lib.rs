//! The engine controller: one owned value holding the whole simulation
//! state, a dispatcher applying Presenter requests to it, and a service
//! loop that runs both on a dedicated worker thread.
//!
//! Threading model: the engine itself is single-threaded and synchronous.
//! `Engine::handle` takes `&mut self`, runs to completion, and returns the
//! updates it produced. All concurrency lives at the edge: `run_service`
//! owns the engine on its thread and speaks FIFO channels with the
//! Presenter, so no operation ever observes (or exposes) mid-handler
//! state. Tests drive `Engine` directly without any threads.
//!
//! Run-loop scheduling is deadline-based: while running, the service waits
//! for the next request *or* the next tick deadline, whichever comes
//! first. The deadline advances by the configured period each tick and
//! clamps to "now" when a tick overruns, which is what keeps long-term
//! cadence honest (`max(0, period - elapsed)` rather than `period` after
//! every tick).

mod dispatch;
mod engine;
mod error;
mod fps;
mod service;

pub use engine::{Engine, EngineSettings};
pub use error::EngineError;
pub use fps::FpsMeter;
pub use service::{EngineChannels, run_service, spawn};
