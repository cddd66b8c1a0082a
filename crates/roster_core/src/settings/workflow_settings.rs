//! Globally disabled workflow stages.
//!
//! # Invariants
//! - In-memory state changes only after the write to storage succeeded.
//! - Stage ids are lowercase snake_case.
//! - Stored value is a JSON array of stage ids, sorted and unique.

use crate::db::DbError;
use chrono::Utc;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DISABLED_STAGES_KEY: &str = "workflow.disabled_stages";

static STAGE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]{0,63}$").expect("valid stage id regex"));

pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Debug)]
pub enum SettingsError {
    InvalidStageId(String),
    /// Stored value cannot be decoded.
    InvalidData(String),
    Db(DbError),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStageId(value) => write!(f, "invalid workflow stage id: `{value}`"),
            Self::InvalidData(message) => write!(f, "invalid stored settings: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for SettingsError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SettingsError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Workflow stage switches backed by the settings table.
pub struct WorkflowSettings<'conn> {
    conn: &'conn Connection,
    disabled: BTreeSet<String>,
}

impl<'conn> WorkflowSettings<'conn> {
    /// Loads the persisted stage switches. Missing rows mean "all enabled".
    pub fn load(conn: &'conn Connection) -> SettingsResult<Self> {
        let stored: Option<String> = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1;",
                [DISABLED_STAGES_KEY],
                |row| row.get(0),
            )
            .optional()?;

        let disabled = match stored {
            Some(raw) => decode_stage_list(&raw)?,
            None => BTreeSet::new(),
        };
        info!(
            "event=settings_load module=settings status=ok disabled_stages={}",
            disabled.len()
        );
        Ok(Self { conn, disabled })
    }

    pub fn is_stage_disabled(&self, stage: &str) -> bool {
        self.disabled.contains(stage.trim())
    }

    /// Disabled stage ids in sorted order.
    pub fn disabled_stages(&self) -> Vec<&str> {
        self.disabled.iter().map(String::as_str).collect()
    }

    /// Enables or disables one stage and persists the full set.
    ///
    /// Returns whether anything changed; unchanged calls skip the write.
    pub fn set_stage_disabled(&mut self, stage: &str, disabled: bool) -> SettingsResult<bool> {
        let stage = stage.trim();
        if !STAGE_ID_RE.is_match(stage) {
            return Err(SettingsError::InvalidStageId(stage.to_string()));
        }
        if self.disabled.contains(stage) == disabled {
            return Ok(false);
        }

        let mut next = self.disabled.clone();
        if disabled {
            next.insert(stage.to_string());
        } else {
            next.remove(stage);
        }
        self.persist(&next)?;
        self.disabled = next;
        info!(
            "event=settings_update module=settings status=ok stage={stage} disabled={disabled}"
        );
        Ok(true)
    }

    fn persist(&self, stages: &BTreeSet<String>) -> SettingsResult<()> {
        let value = serde_json::to_string(stages)
            .map_err(|err| SettingsError::InvalidData(err.to_string()))?;
        self.conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![DISABLED_STAGES_KEY, value, Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }
}

fn decode_stage_list(raw: &str) -> SettingsResult<BTreeSet<String>> {
    let stages: Vec<String> = serde_json::from_str(raw)
        .map_err(|err| SettingsError::InvalidData(format!("{DISABLED_STAGES_KEY}: {err}")))?;
    stages
        .into_iter()
        .map(|stage| {
            if STAGE_ID_RE.is_match(&stage) {
                Ok(stage)
            } else {
                Err(SettingsError::InvalidStageId(stage))
            }
        })
        .collect()
}
