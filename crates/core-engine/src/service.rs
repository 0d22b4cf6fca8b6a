//! The dedicated worker thread: FIFO request consumption plus deadline
//! scheduling for the run loop.
//!
//! The loop has exactly two wake reasons (a request arrived, or the next
//! tick deadline passed) and `recv_deadline` expresses both in one call.
//! While the engine is stopped there is no deadline and the thread parks
//! in a plain `recv`. Either channel closing shuts the service down; the
//! engine (and all its state) is dropped on the worker thread.

use std::thread::{self, JoinHandle};

use core_events::{REQUEST_CHANNEL_CAP, Request, Update};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use tracing::info;

use crate::engine::{Engine, EngineSettings};

/// Presenter-side endpoints of a spawned engine.
pub struct EngineChannels {
    pub requests: Sender<Request>,
    pub updates: Receiver<Update>,
}

/// Spawn the engine on its own thread, returning the Presenter's channel
/// pair and the join handle.
pub fn spawn(settings: EngineSettings) -> (EngineChannels, JoinHandle<()>) {
    let (req_tx, req_rx) = bounded::<Request>(REQUEST_CHANNEL_CAP);
    let (up_tx, up_rx) = unbounded::<Update>();
    let handle = thread::Builder::new()
        .name("petri-engine".into())
        .spawn(move || run_service(Engine::new(settings), req_rx, up_tx))
        .expect("spawning the engine thread");
    (
        EngineChannels {
            requests: req_tx,
            updates: up_rx,
        },
        handle,
    )
}

/// Drive `engine` until the Presenter hangs up.
pub fn run_service(mut engine: Engine, requests: Receiver<Request>, updates: Sender<Update>) {
    info!(target: "engine.service", "service loop started");
    loop {
        let received = match engine.next_tick_deadline() {
            Some(deadline) => match requests.recv_deadline(deadline) {
                Ok(request) => Some(request),
                Err(RecvTimeoutError::Timeout) => None, // tick due
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match requests.recv() {
                Ok(request) => Some(request),
                Err(_) => break,
            },
        };

        let produced = match received {
            Some(request) => engine.handle(request),
            None => engine.tick(),
        };
        for update in produced {
            if updates.send(update).is_err() {
                info!(target: "engine.service", "update channel closed, shutting down");
                return;
            }
        }
    }
    info!(target: "engine.service", "request channel closed, shutting down");
}
