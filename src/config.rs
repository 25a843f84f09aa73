// src/config.rs
//! Process configuration, resolved once at startup from the environment.

use std::env;
use std::path::PathBuf;

use anyhow::Context;
use log::LevelFilter;

/// Environment variable naming the listen address (`host:port`).
pub const LISTEN_ADDR_ENV: &str = "BROWSETRACE_ADDRESS";
/// Environment variable naming the log level.
pub const LOG_LEVEL_ENV: &str = "BROWSETRACE_LOG";
/// Address used when `BROWSETRACE_ADDRESS` is absent.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:51425";

const APP_DIR: &str = "BrowserTrace";
const DB_FILE: &str = "events.db";

/// Everything the agent needs to start.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP listener binds.
    pub listen_addr: String,
    /// Event database path under the per-user data directory.
    pub db_path: PathBuf,
}

impl Config {
    /// Resolve the configuration from the environment.
    ///
    /// The database lives at `<data dir>/BrowserTrace/events.db`, where
    /// `<data dir>` is the platform's per-user application-data directory
    /// (`~/.local/share` on Linux, `~/Library/Application Support` on
    /// macOS, `%APPDATA%` on Windows). Missing directories are created
    /// when the store opens, not here.
    pub fn from_env() -> anyhow::Result<Config> {
        let listen_addr =
            env::var(LISTEN_ADDR_ENV).unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());
        let data_dir = dirs::data_dir().context("cannot determine the user data directory")?;
        Ok(Config {
            listen_addr,
            db_path: data_dir.join(APP_DIR).join(DB_FILE),
        })
    }
}

/// Log level from `BROWSETRACE_LOG`, defaulting to `info` when the variable
/// is absent or unrecognised.
pub fn log_level_from_env() -> LevelFilter {
    match env::var(LOG_LEVEL_ENV)
        .unwrap_or_default()
        .to_uppercase()
        .as_str()
    {
        "ERROR" => LevelFilter::Error,
        "WARN" => LevelFilter::Warn,
        "DEBUG" => LevelFilter::Debug,
        "TRACE" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}
