//! Remote change-log entries.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Kind of roster change recorded by the system of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Added,
    Removed,
    /// Any label the dashboard does not interpret; kept verbatim.
    Other(String),
}

impl ChangeType {
    /// Maps a remote label (`ADD`, `INCLUSAO`, `REMOVE`, `EXCLUSAO`, ...).
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "ADD" | "ADDED" | "INCLUSAO" | "INCLUSÃO" => Self::Added,
            "REMOVE" | "REMOVED" | "EXCLUSAO" | "EXCLUSÃO" => Self::Removed,
            _ => Self::Other(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Added => "ADD",
            Self::Removed => "REMOVE",
            Self::Other(label) => label.as_str(),
        }
    }
}

/// Immutable change-log entry, created server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Wall-clock time as reported by the remote; `None` when unparseable.
    pub timestamp: Option<NaiveDateTime>,
    pub change_type: ChangeType,
    pub description: String,
}
