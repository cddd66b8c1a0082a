//! Blocking HTTP adapter for the remote roster service.
//!
//! # Responsibility
//! - Implement `RosterRemote` over JSON/HTTP with `reqwest::blocking`.
//! - Translate transport and status failures into `RemoteError`.
//!
//! # Invariants
//! - Transport errors and 5xx responses are retryable; 4xx are not.
//! - Request bodies never include more than the documented request fields.

use crate::config::RosterConfig;
use crate::model::session::{AdditionRequest, RemovalRequest};
use crate::remote::remote_spi::RosterRemote;
use crate::remote::remote_types::{RemoteError, RemoteOperation, RemoteResult};
use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};

const USER_AGENT: &str = concat!("roster_core/", env!("CARGO_PKG_VERSION"));
const MAX_ERROR_MESSAGE_CHARS: usize = 200;
const RECORD_ENVELOPE_KEYS: &[&str] = &["data", "items", "content", "result"];
const ERROR_MESSAGE_KEYS: &[&str] = &["message", "mensagem", "error", "detail"];

/// Body of the remove-employee call; the id travels in the path.
#[derive(Serialize)]
struct RemovalBody<'a> {
    reason: &'a str,
    notes: &'a str,
}

/// HTTP implementation of the roster SPI.
///
/// Endpoints, relative to `base_url`:
/// - `GET teams`
/// - `GET teams/{code}/members`
/// - `POST teams/{code}/members`
/// - `DELETE teams/{code}/members/{employeeId}`
/// - `GET history`
#[derive(Debug, Clone)]
pub struct HttpRosterRemote {
    base_url: Url,
    client: Client,
}

impl HttpRosterRemote {
    /// Creates an adapter for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> RemoteResult<Self> {
        let base_url = Url::parse(base_url.trim()).map_err(|err| {
            RemoteError::new(
                RemoteOperation::ListTeams,
                "invalid_base_url",
                format!("invalid remote base url `{base_url}`: {err}"),
                false,
            )
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| {
                RemoteError::new(
                    RemoteOperation::ListTeams,
                    "client_build_failed",
                    err.to_string(),
                    false,
                )
            })?;
        Ok(Self { base_url, client })
    }

    /// Creates an adapter from validated configuration.
    ///
    /// Returns `Ok(None)` when no remote base url is configured.
    pub fn from_config(config: &RosterConfig) -> RemoteResult<Option<Self>> {
        match config.remote_base_url.as_deref() {
            Some(url) => Self::new(url, config.request_timeout()).map(Some),
            None => Ok(None),
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, operation: RemoteOperation, segments: &[&str]) -> RemoteResult<Url> {
        build_endpoint(&self.base_url, segments).ok_or_else(|| {
            RemoteError::new(
                operation,
                "invalid_base_url",
                format!("base url `{}` cannot carry a path", self.base_url),
                false,
            )
        })
    }

    fn fetch_records(
        &self,
        operation: RemoteOperation,
        segments: &[&str],
    ) -> RemoteResult<Vec<Value>> {
        let url = self.endpoint(operation, segments)?;
        let body = self.execute(operation, self.client.get(url))?;
        let value: Value = serde_json::from_str(&body)
            .map_err(|err| RemoteError::invalid_payload(operation, err.to_string()))?;
        extract_records(value).ok_or_else(|| {
            RemoteError::invalid_payload(operation, "response does not contain a record list")
        })
    }

    fn execute(&self, operation: RemoteOperation, request: RequestBuilder) -> RemoteResult<String> {
        let started_at = Instant::now();
        let response = request.send().map_err(|err| {
            warn!(
                "event=remote_call module=remote status=error operation={operation} duration_ms={} error_code=network_error",
                started_at.elapsed().as_millis()
            );
            RemoteError::network(operation, err.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| RemoteError::network(operation, err.to_string()))?;
        if !status.is_success() {
            warn!(
                "event=remote_call module=remote status=error operation={operation} duration_ms={} http_status={}",
                started_at.elapsed().as_millis(),
                status.as_u16()
            );
            let message = error_message_from_body(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            return Err(RemoteError::status(operation, status.as_u16(), message));
        }

        debug!(
            "event=remote_call module=remote status=ok operation={operation} duration_ms={} http_status={}",
            started_at.elapsed().as_millis(),
            status.as_u16()
        );
        Ok(body)
    }
}

impl RosterRemote for HttpRosterRemote {
    fn list_teams(&self) -> RemoteResult<Vec<Value>> {
        self.fetch_records(RemoteOperation::ListTeams, &["teams"])
    }

    fn list_members(&self, team_code: &str) -> RemoteResult<Vec<Value>> {
        self.fetch_records(
            RemoteOperation::ListMembers,
            &["teams", team_code.trim(), "members"],
        )
    }

    fn add_employee(&self, team_code: &str, request: &AdditionRequest) -> RemoteResult<()> {
        let operation = RemoteOperation::AddEmployee;
        let url = self.endpoint(operation, &["teams", team_code.trim(), "members"])?;
        self.execute(operation, self.client.post(url).json(request))?;
        Ok(())
    }

    fn remove_employee(&self, team_code: &str, request: &RemovalRequest) -> RemoteResult<()> {
        let operation = RemoteOperation::RemoveEmployee;
        let url = self.endpoint(
            operation,
            &["teams", team_code.trim(), "members", &request.employee_id],
        )?;
        let body = RemovalBody {
            reason: &request.reason,
            notes: &request.notes,
        };
        self.execute(operation, self.client.delete(url).json(&body))?;
        Ok(())
    }

    fn change_history(&self) -> RemoteResult<Vec<Value>> {
        self.fetch_records(RemoteOperation::ChangeHistory, &["history"])
    }
}

/// Appends percent-encoded path segments to `base`.
fn build_endpoint(base: &Url, segments: &[&str]) -> Option<Url> {
    let mut url = base.clone();
    {
        let mut path = url.path_segments_mut().ok()?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Some(url)
}

/// Accepts a bare array or an object wrapping the array under a common
/// envelope key.
fn extract_records(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(records) => Some(records),
        Value::Object(mut fields) => RECORD_ENVELOPE_KEYS
            .iter()
            .find_map(|key| match fields.remove(*key) {
                Some(Value::Array(records)) => Some(records),
                _ => None,
            }),
        _ => None,
    }
}

fn error_message_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let fields = value.as_object()?;
    ERROR_MESSAGE_KEYS
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(|message| message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect())
}
