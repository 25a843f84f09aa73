// src/db/connection.rs
//! Opening and initialising SQLite with runtime parameters.

use std::{fs, path::Path, time::Duration};

use rusqlite::Connection;

use super::OpenError;

const SCHEMA: &str = include_str!("../../resources/schema.sql");

/// How long a writer waits on a locked database before the call fails with
/// a busy error instead of failing immediately.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open the event database at `path`, creating the file and any missing
/// parent directories, then configure WAL durability and apply the schema.
///
/// The schema is fully `IF NOT EXISTS`, so running it against an existing
/// database never errors and never duplicates objects.
pub(super) fn open_connection(path: &Path) -> Result<Connection, OpenError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}
