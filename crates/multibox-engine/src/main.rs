//! multibox entry point.
//!
//! Wires the infrastructure services to the broadcast engine and runs the
//! single event worker loop.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load config, parse bindings      -- fatal on error
//!  └─ WindowResolver (xdotool)         -- resolution errors degrade to empty
//!  └─ EchoGuard::suspend()
//!  └─ BroadcastEngine::new()           -- clears stuck modifiers
//!  └─ RdevInputSource                  -- hook thread -> mpsc -> tokio channel
//!  └─ worker loop                      -- the single serialization boundary
//! ```
//!
//! Both the capture hook and the Ctrl-C handler feed the same channel, so
//! the shutdown request is processed in order with the events before it.
//! Shutdown restores terminal echo first, then stops the capture hooks;
//! failures on that path are logged but never block exit.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use multibox_core::{KeyBindings, WindowList};
use multibox_engine::application::broadcast_input::{BroadcastEngine, InputInjector};
use multibox_engine::application::resolve_windows::{WindowQuery, WindowResolver};
use multibox_engine::infrastructure::input_capture::{
    rdev::RdevInputSource, InputSource, RawInputEvent,
};
use multibox_engine::infrastructure::storage::config;
use multibox_engine::infrastructure::terminal::EchoGuard;
use multibox_engine::infrastructure::xdo::XdoTool;

/// Broadcast keyboard and mouse input to multiple application windows.
#[derive(Parser, Debug)]
#[command(name = "multibox", version, about)]
struct Args {
    /// Log level: error, warn, info, debug, or trace. Defaults to the
    /// configured level; `RUST_LOG` overrides both.
    #[arg(short = 'l', long, value_name = "level")]
    log_level: Option<String>,

    /// Path to the configuration file.
    #[arg(short, long, value_name = "path")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => config::config_file_path()?,
    };
    let first_run = !config_path.exists();
    let config = config::load_or_init(&config_path)
        .with_context(|| format!("loading config at {}", config_path.display()))?;

    // Structured logging: RUST_LOG beats the CLI flag beats the config file.
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.general.log_level);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow::anyhow!("invalid log level {level:?}: {e}"))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("multibox starting");
    if first_run {
        info!(path = %config_path.display(), "wrote default config file");
    }
    config.dump();

    let bindings = KeyBindings::from_strings(
        &config.keys.start_broadcast,
        &config.keys.stop_broadcast,
        &config.keys.stop_program,
        &config.keys.next_window,
    )
    .context("invalid key binding in configuration")?;

    // ── Window resolution ─────────────────────────────────────────────────────
    // A failed resolution degrades to an empty set: the engine keeps running
    // and the operator can fix patterns and restart.
    let xdo = Arc::new(XdoTool::new());
    let resolver = WindowResolver::new(Arc::clone(&xdo) as Arc<dyn WindowQuery>);

    let window_list = resolver
        .build_window_list(
            &config.windows.master_pattern,
            &config.windows.slave_pattern,
        )
        .await
        .unwrap_or_else(|error| {
            error!(%error, "window resolution failed; starting with an empty window list");
            WindowList::default()
        });
    let master_ids = resolver
        .map_names_to_ids(&config.windows.id_query, &config.windows.master_pattern)
        .await
        .unwrap_or_else(|error| {
            error!(%error, "master id translation failed");
            Vec::new()
        });
    let slave_ids = resolver
        .map_names_to_ids(&config.windows.id_query, &config.windows.slave_pattern)
        .await
        .unwrap_or_else(|error| {
            error!(%error, "slave id translation failed");
            Vec::new()
        });
    debug!(?slave_ids, "identified slave windows");

    // ── Engine and capture ────────────────────────────────────────────────────
    let mut echo = EchoGuard::suspend();

    let mut engine = BroadcastEngine::new(
        bindings,
        window_list,
        master_ids,
        slave_ids,
        Arc::clone(&xdo) as Arc<dyn InputInjector>,
        resolver,
    )
    .await;

    let source = RdevInputSource::new();
    let capture_rx = source.start().context("starting input capture")?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    // Bridge the blocking capture channel into the async worker.
    let bridge_tx = event_tx.clone();
    std::thread::spawn(move || {
        for event in capture_rx {
            if bridge_tx.send(event).is_err() {
                break;
            }
        }
    });

    // Ctrl-C injects the shutdown poison event into the same channel, so the
    // stop request is ordered behind whatever is already queued.
    let interrupt_tx = event_tx;
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; shutting down");
            let _ = interrupt_tx.send(RawInputEvent::Shutdown);
        }
    });

    info!("multibox ready");

    // The single worker loop: every keyboard and mouse event mutates engine
    // state from here and nowhere else.
    while let Some(event) = event_rx.recv().await {
        if engine.handle_event(event).await.is_break() {
            break;
        }
    }

    // Restore the terminal before anything else, then stop the capture hooks
    // (keyboard and mouse share the listener).
    echo.resume();
    source.stop();
    info!("shutdown complete");
    Ok(())
}
