// src/server/routes.rs
//! Request handlers for the two public operations.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::AppState;
use crate::db::WriteError;
use crate::events;

/// Liveness probe. Answers without touching the store, so it keeps working
/// even when the database is wedged.
pub(super) async fn healthz() -> &'static str {
    "ok"
}

/// `POST /events`: decode the batch, store it, answer with a bare status.
///
/// An empty batch is a successful no-op that never reaches the store.
/// Decode failures are the caller's fault and get a 400; everything after a
/// successful decode, validation included, is reported as a generic 500 so
/// the response never leaks what the agent saw.
pub(super) async fn ingest_events(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, IngestError> {
    let batch = events::decode_batch(&body)?;
    if batch.events.is_empty() {
        return Ok(StatusCode::NO_CONTENT);
    }

    let count = batch.events.len();
    let store = Arc::clone(&state.store);
    // Inserts block on the store mutex and on fsync; keep them off the
    // async workers.
    tokio::task::spawn_blocking(move || store.insert_batch(&batch)).await??;

    log::debug!("stored batch of {count} event(s)");
    Ok(StatusCode::NO_CONTENT)
}

/// Failure modes of a submission and how they map onto the wire. Response
/// bodies stay generic; the detail goes to the log only.
#[derive(Debug, Error)]
pub(super) enum IngestError {
    #[error("malformed JSON body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error("insert task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        match &self {
            IngestError::Decode(err) => {
                log::debug!("rejected submission: {err}");
                (StatusCode::BAD_REQUEST, "invalid JSON body").into_response()
            }
            IngestError::Write(err) => {
                log::error!("failed to store batch: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, "failed to store events").into_response()
            }
            IngestError::Task(err) => {
                log::error!("insert task aborted: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, "failed to store events").into_response()
            }
        }
    }
}
