//! Runtime configuration for the roster core.
//!
//! # Responsibility
//! - Define tunables with defaults (remote endpoint, timeouts, banner ttl,
//!   logging, settings database).
//! - Load from JSON or from `ROSTER_*` environment variables.
//!
//! # Invariants
//! - A config returned by `from_json_str`/`from_env` has passed `validate()`.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const ENV_REMOTE_URL: &str = "ROSTER_REMOTE_URL";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "ROSTER_REQUEST_TIMEOUT_MS";
pub const ENV_BANNER_TTL_MS: &str = "ROSTER_BANNER_TTL_MS";
pub const ENV_LOG_LEVEL: &str = "ROSTER_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ROSTER_LOG_DIR";
pub const ENV_SETTINGS_DB: &str = "ROSTER_SETTINGS_DB";

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_BANNER_TTL_MS: u64 = 5_000;

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid config json: {err}"),
            Self::InvalidValue { key, value } => write!(f, "invalid value for `{key}`: `{value}`"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Roster core configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RosterConfig {
    /// Base URL of the remote roster service; `None` runs baseline-only.
    pub remote_base_url: Option<String>,
    pub request_timeout_ms: u64,
    /// How long a commit summary banner stays visible.
    pub banner_ttl_ms: u64,
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logs.
    pub log_dir: Option<String>,
    /// SQLite file holding workflow settings; `None` keeps them in memory.
    pub settings_db_path: Option<String>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            remote_base_url: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            banner_ttl_ms: DEFAULT_BANNER_TTL_MS,
            log_level: default_log_level().to_string(),
            log_dir: None,
            settings_db_path: None,
        }
    }
}

impl RosterConfig {
    /// Parses a JSON document; omitted keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `ROSTER_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = value(ENV_REMOTE_URL) {
            config.remote_base_url = Some(url.trim().to_string());
        }
        if let Some(raw) = value(ENV_REQUEST_TIMEOUT_MS) {
            config.request_timeout_ms = parse_millis(ENV_REQUEST_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = value(ENV_BANNER_TTL_MS) {
            config.banner_ttl_ms = parse_millis(ENV_BANNER_TTL_MS, &raw)?;
        }
        if let Some(level) = value(ENV_LOG_LEVEL) {
            config.log_level = level.trim().to_string();
        }
        config.log_dir = value(ENV_LOG_DIR);
        config.settings_db_path = value(ENV_SETTINGS_DB);

        config.validate()?;
        Ok(config)
    }

    /// Rejects zero durations and non-http(s) remote URLs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "requestTimeoutMs",
                value: "0".to_string(),
            });
        }
        if self.banner_ttl_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "bannerTtlMs",
                value: "0".to_string(),
            });
        }
        if let Some(url) = &self.remote_base_url {
            let lower = url.to_ascii_lowercase();
            if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    key: "remoteBaseUrl",
                    value: url.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn banner_ttl(&self) -> Duration {
        Duration::from_millis(self.banner_ttl_ms)
    }
}

fn parse_millis(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        })
}
