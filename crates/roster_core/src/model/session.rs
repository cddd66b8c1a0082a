//! Edit session value object.
//!
//! # Responsibility
//! - Hold the working copy of one team's roster plus staged requests.
//! - Stay a plain serializable value; mutation rules live in
//!   `service::edit_session`.
//!
//! # Invariants
//! - `members` contains no duplicate employee id.
//! - `recently_removed` only holds employees removed within this session
//!   and not currently in `members`.
//! - `manager_id` never appears in `members`.

use crate::model::employee::{normalize_employee_id, Employee, EmployeeId};
use crate::model::team::{Team, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Staged removal, sent verbatim to the remote remove-employee call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalRequest {
    pub employee_id: EmployeeId,
    pub reason: String,
    pub notes: String,
}

/// Staged addition, sent verbatim to the remote add-employee call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionRequest {
    pub employee_id: EmployeeId,
    pub name: String,
    pub reason: String,
    pub notes: String,
}

/// Mutable buffer of uncommitted roster changes for one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSession {
    /// Correlation id for logs; not sent to the remote.
    pub session_id: Uuid,
    pub team_id: TeamId,
    pub team_code: String,
    /// Manager of the team when the session opened; never a member.
    pub manager_id: EmployeeId,
    /// Working copy of the roster.
    pub members: Vec<Employee>,
    pub pending_removals: Vec<RemovalRequest>,
    pub pending_additions: Vec<AdditionRequest>,
    pub recently_removed: Vec<Employee>,
}

impl EditSession {
    /// Opens a session by cloning the team's current members.
    pub fn open(team: &Team) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            team_id: team.id,
            team_code: team.code.clone(),
            manager_id: team.manager.id.clone(),
            members: team.members.clone(),
            pending_removals: Vec::new(),
            pending_additions: Vec::new(),
            recently_removed: Vec::new(),
        }
    }

    pub fn contains(&self, employee_id: &str) -> bool {
        self.position_of(employee_id).is_some()
    }

    pub fn is_manager(&self, employee_id: &str) -> bool {
        self.manager_id == normalize_employee_id(employee_id)
    }

    /// Employee removed earlier in this session, if any.
    pub fn removed_entry(&self, employee_id: &str) -> Option<&Employee> {
        let id = normalize_employee_id(employee_id);
        self.recently_removed.iter().find(|removed| removed.id == id)
    }

    pub(crate) fn position_of(&self, employee_id: &str) -> Option<usize> {
        let id = normalize_employee_id(employee_id);
        self.members.iter().position(|member| member.id == id)
    }

    /// Ids currently in the working copy.
    pub fn current_ids(&self) -> HashSet<&str> {
        self.members.iter().map(|member| member.id.as_str()).collect()
    }

    /// Total staged operations (removals plus additions).
    pub fn pending_count(&self) -> usize {
        self.pending_removals.len() + self.pending_additions.len()
    }

    pub fn has_changes(&self) -> bool {
        self.pending_count() > 0
    }
}

/// Why an employee is offered for (re-)addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CandidateSource {
    /// Present in the baseline roster for the team.
    Original,
    /// Removed earlier within the open session.
    RemovedThisSession,
}

/// One entry of the derived candidate pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub employee: Employee,
    pub source: CandidateSource,
}
