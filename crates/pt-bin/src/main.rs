//! Petri entrypoint: a headless JSON-lines bridge to the engine.
//!
//! The Presenter (whatever draws pixels: a UI process, a test harness, a
//! shell pipeline) writes one request document per line on stdin and reads
//! one update document per line from stdout. The engine itself runs on its
//! dedicated worker thread; this binary is transport plumbing plus process
//! concerns (logging, config discovery, CLI overrides) and owns no
//! simulation state whatsoever.

use anyhow::Result;
use clap::Parser;
use core_engine::{EngineSettings, spawn};
use core_events::Request;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Once;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "petri", version, about = "Infinite-grid Life engine")] // minimal metadata
struct Args {
    /// Optional configuration file path (overrides discovery of `petri.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Rule override, e.g. "B36/S23". Applied after the config file.
    #[arg(long = "rule")]
    pub rule: Option<String>,
    /// Target FPS override, fractional allowed, clamped to (0, 60].
    #[arg(long = "fps")]
    pub fps: Option<f64>,
}

fn configure_logging() -> Option<WorkerGuard> {
    let file_appender = tracing_appender::rolling::never(".", "petri.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        Err(_err) => {
            // Global tracing subscriber already installed; drop guard so
            // the writer shuts down.
            None
        }
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn build_settings(args: &Args) -> Result<EngineSettings> {
    let config = core_config::load_from(args.config.clone())?;
    let mut settings = EngineSettings::from_config(&config);
    if let Some(rule) = &args.rule {
        match core_rule::Rule::parse(rule) {
            Ok(parsed) => settings.rule = parsed,
            Err(_) => warn!(target: "runtime", rule = %rule, "--rule override invalid, ignoring"),
        }
    }
    if let Some(fps) = args.fps {
        if fps.is_finite() && fps > 0.0 {
            settings.target_fps = fps.min(60.0);
        } else {
            warn!(target: "runtime", fps, "--fps override out of range, ignoring");
        }
    }
    Ok(settings)
}

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();
    let args = Args::parse();
    info!(target: "runtime", "startup");

    let settings = build_settings(&args)?;
    let (channels, engine_thread) = spawn(settings);

    // Updates → stdout, one JSON document per line. A broken pipe just
    // ends the writer; the engine notices when its channel closes.
    let updates = channels.updates;
    let writer_thread = std::thread::Builder::new()
        .name("petri-stdout".into())
        .spawn(move || {
            let stdout = std::io::stdout();
            for update in updates.iter() {
                let mut lock = stdout.lock();
                let encoded = match serde_json::to_string(&update) {
                    Ok(s) => s,
                    Err(e) => {
                        error!(target: "runtime", error = %e, "update serialization failed");
                        continue;
                    }
                };
                if writeln!(lock, "{encoded}").is_err() {
                    break;
                }
                let _ = lock.flush();
            }
        })
        .expect("spawning the stdout writer");

    // stdin → requests. EOF is the shutdown signal.
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<Request>(trimmed) {
            Ok(request) => {
                if channels.requests.send(request).is_err() {
                    break; // engine gone
                }
            }
            Err(e) => warn!(target: "runtime", error = %e, "unparseable request line"),
        }
    }

    drop(channels.requests);
    engine_thread.join().ok();
    writer_thread.join().ok();
    info!(target: "runtime", "shutdown");
    Ok(())
}
