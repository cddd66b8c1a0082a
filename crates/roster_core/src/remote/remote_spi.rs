//! Remote system-of-record SPI.

use crate::model::session::{AdditionRequest, RemovalRequest};
use crate::remote::remote_types::RemoteResult;
use serde_json::Value;

/// Operations consumed from the remote roster service.
///
/// Read operations return raw JSON records; callers pass them through
/// `remote::normalize` before use. Calls are issued sequentially by the
/// callers, so implementations need no internal ordering guarantees.
pub trait RosterRemote {
    /// Lists teams with manager and member references.
    fn list_teams(&self) -> RemoteResult<Vec<Value>>;

    /// Lists authoritative members of one team. Records may omit the role.
    fn list_members(&self, team_code: &str) -> RemoteResult<Vec<Value>>;

    /// Adds one employee to a team.
    fn add_employee(&self, team_code: &str, request: &AdditionRequest) -> RemoteResult<()>;

    /// Removes one employee from a team.
    fn remove_employee(&self, team_code: &str, request: &RemovalRequest) -> RemoteResult<()>;

    /// Returns the ordered change log.
    fn change_history(&self) -> RemoteResult<Vec<Value>>;
}
