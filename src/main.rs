// src/main.rs

//! Agent entry-point.
//!
//! 1. Set up structured logging
//! 2. Resolve configuration from the environment
//! 3. Open the event store (SQLite, WAL/NORMAL)
//! 4. Serve HTTP until SIGINT / SIGTERM
//! 5. Drain in-flight requests, then close the store

// ───── std / 3rd-party imports ──────────────────────────────────────────────
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use fern::Dispatch;
use log::LevelFilter;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

// ───── local imports ────────────────────────────────────────────────────────
use browsetrace::config::{self, Config};
use browsetrace::db::EventStore;
use browsetrace::server::{self, AppState};

// ───── helpers ──────────────────────────────────────────────────────────────

/// Configure global logging on stdout.
fn setup_logging(level: LevelFilter) -> Result<(), fern::InitError> {
    Dispatch::new()
        .format(|out, msg, record| {
            out.finish(format_args!(
                "[{}][{:5}][{}] {}",
                Local::now().to_rfc3339(),
                record.level(),
                record.target(), // Only print the target (module path)
                msg
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

/// Resolves once the process receives SIGINT or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("SIGINT handler registration failed");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler registration failed")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

// ───── agent logic ──────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1 ─ Logging
    setup_logging(config::log_level_from_env()).context("Logging setup failed")?;
    log::info!("Agent bootstrap initiated");

    // 2 ─ Configuration
    let config = Config::from_env()?;

    // 3 ─ Event store
    let store = Arc::new(EventStore::open(&config.db_path).with_context(|| {
        format!("Cannot open event store at {}", config.db_path.display())
    })?);

    // 4 ─ HTTP listener
    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Cannot bind {}", config.listen_addr))?;
    log::info!("Listening on {}", config.listen_addr);

    // 5 ─ Shutdown signal
    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            log::warn!("Shutdown requested");
            shutdown.cancel();
        }
    });

    // 6 ─ Serve, drain, close
    let state = AppState {
        store: Arc::clone(&store),
    };
    server::serve(listener, state, shutdown)
        .await
        .context("HTTP server failed")?;

    if let Err(e) = store.close() {
        log::error!("Event store close failed: {e}");
    }
    log::info!("Agent stopped cleanly");
    Ok(())
}
