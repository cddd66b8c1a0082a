//! Remote call identities and the shared error envelope.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Remote operation a call or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteOperation {
    ListTeams,
    ListMembers,
    AddEmployee,
    RemoveEmployee,
    ChangeHistory,
}

impl RemoteOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListTeams => "list_teams",
            Self::ListMembers => "list_members",
            Self::AddEmployee => "add_employee",
            Self::RemoveEmployee => "remove_employee",
            Self::ChangeHistory => "change_history",
        }
    }
}

impl Display for RemoteOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error envelope returned by every remote adapter.
///
/// `code` is a stable machine-readable token (`network_error`,
/// `http_503`, ...); `message` is safe to show to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    pub operation: RemoteOperation,
    pub code: String,
    pub message: String,
    /// Network and 5xx failures are retryable; 4xx are not.
    pub retryable: bool,
}

impl RemoteError {
    pub fn new(
        operation: RemoteOperation,
        code: impl Into<String>,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            operation,
            code: code.into(),
            message: message.into(),
            retryable,
        }
    }

    /// Transport-level failure (unreachable host, timeout).
    pub fn network(operation: RemoteOperation, message: impl Into<String>) -> Self {
        Self::new(operation, "network_error", message, true)
    }

    /// Non-success HTTP status.
    pub fn status(operation: RemoteOperation, status: u16, message: impl Into<String>) -> Self {
        Self::new(operation, format!("http_{status}"), message, status >= 500)
    }

    /// Response body could not be interpreted.
    pub fn invalid_payload(operation: RemoteOperation, message: impl Into<String>) -> Self {
        Self::new(operation, "invalid_payload", message, false)
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed ({}): {}", self.operation, self.code, self.message)
    }
}

impl Error for RemoteError {}
