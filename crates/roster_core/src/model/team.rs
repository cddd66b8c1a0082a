//! Team model.
//!
//! # Invariants
//! - `manager.id` never appears among `members`.
//! - `members` holds at most one record per employee id.

use crate::model::employee::{normalize_employee_id, Employee};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Numeric team identifier assigned by the system of record.
pub type TeamId = i64;

/// One organizational team and its roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    /// Short identifier such as `GECOC`.
    pub code: String,
    pub name: String,
    pub manager: Employee,
    pub members: Vec<Employee>,
}

/// Read-only, bundled reference record for one team.
pub type BaselineTeam = Team;

impl Team {
    /// Whether `code` names this team (case-insensitive).
    pub fn matches_code(&self, code: &str) -> bool {
        self.code.eq_ignore_ascii_case(code.trim())
    }

    /// Returns one member by id.
    pub fn member(&self, employee_id: &str) -> Option<&Employee> {
        let id = normalize_employee_id(employee_id);
        self.members.iter().find(|member| member.id == id)
    }

    /// Returns the manager or member with this id.
    pub fn person(&self, employee_id: &str) -> Option<&Employee> {
        let id = normalize_employee_id(employee_id);
        if self.manager.id == id {
            return Some(&self.manager);
        }
        self.member(&id)
    }

    pub fn has_member(&self, employee_id: &str) -> bool {
        self.member(employee_id).is_some()
    }

    /// Ids of all members, in roster order.
    pub fn member_ids(&self) -> Vec<&str> {
        self.members.iter().map(|member| member.id.as_str()).collect()
    }

    /// Whether the manager-exclusion and uniqueness invariants hold.
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::new();
        self.members
            .iter()
            .all(|member| member.id != self.manager.id && seen.insert(member.id.as_str()))
    }

    /// Restores the roster invariants in place: drops the manager and any
    /// repeated id from `members`, keeping first occurrences.
    ///
    /// Returns the number of records removed.
    pub fn enforce_invariants(&mut self) -> usize {
        let before = self.members.len();
        let manager_id = self.manager.id.clone();
        let mut seen = HashSet::new();
        self.members
            .retain(|member| member.id != manager_id && seen.insert(member.id.clone()));
        before - self.members.len()
    }
}
