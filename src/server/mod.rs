// src/server/mod.rs
//! HTTP boundary: the ingestion endpoint, the health check, and the
//! accept/drain lifecycle around them.
//!
//! The store handle is injected through `AppState` once at startup and
//! shared by every request; the endpoint is the only caller of the store's
//! write path. Shutdown is an explicit cancellation signal: once it fires
//! the listener admits no new work, in-flight requests get a bounded grace
//! window, and the caller tears the store down strictly afterwards.

mod routes;

use std::future::IntoFuture;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;

use crate::db::EventStore;

/// Per-request time budget, independent of shutdown.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// How long in-flight requests may keep running after the shutdown signal
/// before they are abandoned.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// A submission can carry a whole page-load's worth of visible text; the
/// axum default of 2 MiB is too small for that.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// State shared with every request handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EventStore>,
}

/// Build the complete router.
///
/// `POST /events` is the only write path; any other method on `/events` is
/// answered with 405 by the method router before the store is ever touched.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(routes::healthz))
        .route("/events", post(routes::ingest_events))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Serve on `listener` until `shutdown` is cancelled, then drain.
///
/// Cancellation stops the accept loop immediately; requests already in
/// flight get `SHUTDOWN_GRACE` to finish. If the window elapses they are
/// abandoned, the forced exit is logged, and this returns anyway. The store
/// must outlive this call and be closed only after it returns.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> io::Result<()> {
    let graceful = {
        let shutdown = shutdown.clone();
        async move { shutdown.cancelled().await }
    };
    let server = axum::serve(listener, router(state))
        .with_graceful_shutdown(graceful)
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result,
        () = shutdown.cancelled() => {
            match tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await {
                Ok(result) => result,
                Err(_) => {
                    log::warn!(
                        "drain window of {}s elapsed, abandoning in-flight requests",
                        SHUTDOWN_GRACE.as_secs()
                    );
                    Ok(())
                }
            }
        }
    }
}
