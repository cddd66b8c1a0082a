//! Durable dashboard settings.
//!
//! # Responsibility
//! - Load persisted settings explicitly at startup.
//! - Route every change through a setter that writes through to storage.

use crate::config::RosterConfig;
use crate::db::{open_db, open_db_in_memory, DbResult};
use rusqlite::Connection;

pub mod workflow_settings;

/// Opens the configured settings database, or an in-memory one when no
/// path is configured.
pub fn open_settings_db(config: &RosterConfig) -> DbResult<Connection> {
    match config.settings_db_path.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => open_db(path),
        _ => open_db_in_memory(),
    }
}
