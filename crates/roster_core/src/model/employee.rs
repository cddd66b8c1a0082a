//! Employee model and personnel-code helpers.
//!
//! # Responsibility
//! - Define the canonical employee record used after normalization.
//! - Provide id normalization shared by store, session and resolver.
//!
//! # Invariants
//! - Ids are compared only after `normalize_employee_id`.
//! - `role` and `name` are never empty on a constructed record; missing
//!   values are replaced by the `*_NOT_INFORMED` placeholders.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Personnel code (`matrícula`) identifying one employee.
pub type EmployeeId = String;

/// Placeholder used when no source provides a role.
pub const ROLE_NOT_INFORMED: &str = "role not informed";

/// Placeholder used when no source provides a name.
pub const NAME_NOT_INFORMED: &str = "name not informed";

static PERSONNEL_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][0-9]{7}$").expect("valid personnel code regex"));

/// Where an employee record was materialized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceTag {
    /// Returned by the remote system of record.
    Remote,
    /// Taken from the bundled baseline dataset.
    Baseline,
    /// Added by an operator inside an edit session.
    Staged,
}

/// Canonical employee record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub role: String,
    pub source_tag: SourceTag,
}

impl Employee {
    /// Builds a record, normalizing the id and filling blank fields with
    /// placeholders.
    pub fn new(
        id: impl AsRef<str>,
        name: impl Into<String>,
        role: impl Into<String>,
        source_tag: SourceTag,
    ) -> Self {
        Self {
            id: normalize_employee_id(id.as_ref()),
            name: non_blank_or(name.into(), NAME_NOT_INFORMED),
            role: non_blank_or(role.into(), ROLE_NOT_INFORMED),
            source_tag,
        }
    }

    /// Returns a copy re-tagged with another source.
    pub fn retagged(&self, source_tag: SourceTag) -> Self {
        Self {
            source_tag,
            ..self.clone()
        }
    }

    /// Whether the role came from a real source instead of the placeholder.
    pub fn has_informed_role(&self) -> bool {
        self.role != ROLE_NOT_INFORMED
    }
}

/// Canonical form of a personnel code: trimmed and upper-cased.
pub fn normalize_employee_id(raw: &str) -> EmployeeId {
    raw.trim().to_ascii_uppercase()
}

/// Whether `value` (already normalized) looks like a personnel code,
/// i.e. one letter followed by seven digits (`F7023257`).
pub fn is_personnel_code(value: &str) -> bool {
    PERSONNEL_CODE_RE.is_match(value)
}

fn non_blank_or(value: String, placeholder: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder.to_string()
    } else if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}
