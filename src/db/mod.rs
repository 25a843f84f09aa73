// src/db/mod.rs
//! Embedded event store: schema enforcement, domain validation, and atomic
//! batch writes.
//!
//! The store moves through `Unopened -> Opening -> Ready -> Closed`.
//! `open` runs the (idempotent) schema before handing back a `Ready`
//! handle; `close` is terminal and idempotent. Validation happens twice on
//! purpose: once here in `validate`, and again independently at the schema
//! boundary (`CHECK` constraints plus the `json(?)` re-parse on insert).

mod connection;

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{Connection, params};
use thiserror::Error;

use crate::events::{Batch, Event, EventKind};

const INSERT_EVENT: &str = "INSERT INTO events (ts_utc, ts_iso, url, title, type, data_json) \
     VALUES (?1, ?2, ?3, ?4, ?5, json(?6))";

/// Failure to open or initialise the store. Fatal at startup; the process
/// must not run with a half-initialised database.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("failed to create database directory: {0}")]
    CreateDir(#[from] std::io::Error),
    #[error("failed to initialise database: {0}")]
    Sql(#[from] rusqlite::Error),
}

/// A well-formed event that breaks a domain rule. Checks run in a fixed
/// order and stop at the first violation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("url cannot be empty")]
    EmptyUrl,
    #[error("event type cannot be empty")]
    EmptyType,
    #[error("unknown event type: {0:?}")]
    UnknownType(String),
    #[error("timestamp must be positive, got {0}")]
    NonPositiveTimestamp(i64),
}

/// Failure at any stage of a batch write. Whatever the stage, the whole
/// batch is rolled back; no partial state is ever visible.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("store is closed")]
    Closed,
    #[error("invalid event at index {index}: {source}")]
    InvalidEvent {
        index: usize,
        source: ValidationError,
    },
    #[error("failed to serialise event payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),
}

/// Handle to the embedded event database.
///
/// One instance is shared by every concurrent caller for the lifetime of
/// the process. The mutex serialises writers in-process; WAL mode keeps
/// readers on other connections unblocked while a batch commits. `None`
/// behind the mutex means the store is closed.
pub struct EventStore {
    conn: Mutex<Option<Connection>>,
}

impl EventStore {
    /// Open the store at `path`, creating the file, its parent directories
    /// and the schema as needed. Reopening an existing database is a no-op
    /// beyond the pragma setup.
    pub fn open(path: &Path) -> Result<EventStore, OpenError> {
        let conn = connection::open_connection(path)?;
        log::info!("Event store ready at {}", path.display());
        Ok(EventStore {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Check one event against the domain rules: URL non-empty, then type
    /// non-empty, then type in the closed set, then timestamp positive.
    /// Reports only the first violation.
    pub fn validate(event: &Event) -> Result<(), ValidationError> {
        if event.url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        if event.event_type.is_empty() {
            return Err(ValidationError::EmptyType);
        }
        if EventKind::parse(&event.event_type).is_none() {
            return Err(ValidationError::UnknownType(event.event_type.clone()));
        }
        if event.ts_utc <= 0 {
            return Err(ValidationError::NonPositiveTimestamp(event.ts_utc));
        }
        Ok(())
    }

    /// Persist a batch atomically: one row per event, in batch order, or no
    /// rows at all. One transaction and one durable sync per batch rather
    /// than per event.
    pub fn insert_batch(&self, batch: &Batch) -> Result<(), WriteError> {
        let mut guard = self.lock();
        let conn = guard.as_mut().ok_or(WriteError::Closed)?;

        // Dropping `tx` on any early return rolls the whole batch back.
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_EVENT)?;
            for (index, event) in batch.events.iter().enumerate() {
                Self::validate(event).map_err(|source| WriteError::InvalidEvent { index, source })?;
                let data_json = serde_json::to_string(&event.data)?;
                stmt.execute(params![
                    event.ts_utc,
                    event.ts_iso,
                    event.url,
                    event.title,
                    event.event_type,
                    data_json,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Release the underlying handle. Idempotent: closing an already-closed
    /// store is a no-op.
    pub fn close(&self) -> Result<(), rusqlite::Error> {
        match self.lock().take() {
            Some(conn) => conn.close().map_err(|(_, err)| err),
            None => Ok(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
