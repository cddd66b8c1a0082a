//! Change-history viewer.

use crate::model::history::HistoryEntry;
use crate::remote::normalize::normalize_history;
use crate::remote::remote_spi::RosterRemote;
use crate::remote::remote_types::RemoteResult;
use chrono::NaiveDateTime;
use log::info;

/// Display layout for history timestamps.
pub const HISTORY_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Fetches and normalizes the remote change log, keeping remote order.
///
/// There is no local fallback; remote errors are returned as-is.
pub fn fetch_history<R: RosterRemote + ?Sized>(remote: &R) -> RemoteResult<Vec<HistoryEntry>> {
    let records = remote.change_history()?;
    let entries = normalize_history(&records);
    info!(
        "event=history_fetch module=service status=ok entries={}",
        entries.len()
    );
    Ok(entries)
}

/// Formats a timestamp for display; missing timestamps render as `-`.
pub fn format_timestamp(timestamp: Option<&NaiveDateTime>) -> String {
    timestamp
        .map(|value| value.format(HISTORY_TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// One-line rendering: `DD/MM/YYYY HH:MM | TYPE | description`.
pub fn format_entry(entry: &HistoryEntry) -> String {
    format!(
        "{} | {} | {}",
        format_timestamp(entry.timestamp.as_ref()),
        entry.change_type.label(),
        entry.description
    )
}
