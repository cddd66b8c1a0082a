//! Commit replay against the remote system of record.
//!
//! # Responsibility
//! - Send every staged removal, then every staged addition, one call per
//!   request, in staging order.
//! - Record each call's outcome independently and summarize them.
//! - Refresh the committed team from the remote afterwards.
//!
//! # Invariants
//! - A failed call never stops later calls.
//! - Exactly `pending_removals + pending_additions` calls are issued.
//! - A failed refresh leaves the session's working copy on display and the
//!   team flagged `Unconfirmed`; nothing is rolled back.

use crate::model::employee::EmployeeId;
use crate::model::session::EditSession;
use crate::remote::remote_spi::RosterRemote;
use crate::remote::remote_types::RemoteError;
use crate::store::roster_store::RosterStore;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Kind of per-item remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Remove,
    Add,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remove => "remove",
            Self::Add => "add",
        }
    }
}

/// Result of one per-item call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub kind: OperationKind,
    pub employee_id: EmployeeId,
    /// `None` when the call succeeded.
    pub error: Option<RemoteError>,
}

impl OperationOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Whether the post-commit refresh reached the remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "state")]
pub enum RefreshState {
    Confirmed,
    /// Displayed roster is the local edit; latest remote state unknown.
    Unconfirmed { reason: String },
}

/// User-facing summary of one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSummary {
    /// True when there was nothing to send or every call succeeded.
    pub success: bool,
    pub message: String,
    /// Outcomes in call order: removals first, then additions.
    pub outcomes: Vec<OperationOutcome>,
    pub refresh: RefreshState,
}

impl CommitSummary {
    pub fn failures(&self) -> impl Iterator<Item = &OperationOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.succeeded())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn is_confirmed(&self) -> bool {
        self.refresh == RefreshState::Confirmed
    }
}

/// Replays committed sessions through a remote.
pub struct SyncEngine<'r, R: RosterRemote + ?Sized> {
    remote: &'r R,
}

impl<'r, R: RosterRemote + ?Sized> SyncEngine<'r, R> {
    pub fn new(remote: &'r R) -> Self {
        Self { remote }
    }

    /// Sends the session's staged requests and refreshes its team in
    /// `store`. Never fails as a whole; see `CommitSummary`.
    pub fn commit(&self, session: &EditSession, store: &mut RosterStore) -> CommitSummary {
        let started_at = Instant::now();
        let team_code = session.team_code.as_str();
        info!(
            "event=commit module=sync status=start session_id={} team={team_code} removals={} additions={}",
            session.session_id,
            session.pending_removals.len(),
            session.pending_additions.len()
        );

        let mut outcomes = Vec::with_capacity(session.pending_count());
        for request in &session.pending_removals {
            let result = self.remote.remove_employee(team_code, request);
            outcomes.push(self.record(session, OperationKind::Remove, &request.employee_id, result));
        }
        for request in &session.pending_additions {
            let result = self.remote.add_employee(team_code, request);
            outcomes.push(self.record(session, OperationKind::Add, &request.employee_id, result));
        }

        let refresh = match store.load_members(self.remote, team_code) {
            Ok(_) => RefreshState::Confirmed,
            Err(err) => {
                let reason = err.to_string();
                if let Err(mark_err) = store.mark_unconfirmed(team_code, session.members.clone()) {
                    warn!(
                        "event=commit_refresh module=sync status=error session_id={} team={team_code} error={mark_err}",
                        session.session_id
                    );
                }
                RefreshState::Unconfirmed { reason }
            }
        };

        let summary = summarize(outcomes, refresh);
        info!(
            "event=commit module=sync status={} session_id={} team={team_code} operations={} failed={} confirmed={} duration_ms={}",
            if summary.success { "ok" } else { "partial" },
            session.session_id,
            summary.outcomes.len(),
            summary.failure_count(),
            summary.is_confirmed(),
            started_at.elapsed().as_millis()
        );
        summary
    }

    fn record(
        &self,
        session: &EditSession,
        kind: OperationKind,
        employee_id: &str,
        result: Result<(), RemoteError>,
    ) -> OperationOutcome {
        let error = match result {
            Ok(()) => None,
            Err(err) => {
                warn!(
                    "event=commit_item module=sync status=error session_id={} kind={} employee_id={employee_id} error_code={}",
                    session.session_id,
                    kind.as_str(),
                    err.code
                );
                Some(err)
            }
        };
        OperationOutcome {
            kind,
            employee_id: employee_id.to_string(),
            error,
        }
    }
}

/// Builds the banner message and success flag from per-item outcomes.
pub fn summarize(outcomes: Vec<OperationOutcome>, refresh: RefreshState) -> CommitSummary {
    let total = outcomes.len();
    let failed: Vec<String> = outcomes
        .iter()
        .filter_map(|outcome| {
            outcome.error.as_ref().map(|err| {
                format!(
                    "{} {} ({})",
                    outcome.kind.as_str(),
                    outcome.employee_id,
                    err.message
                )
            })
        })
        .collect();

    let success = failed.is_empty();
    let mut message = if total == 0 {
        "No pending changes.".to_string()
    } else if success {
        let removals = outcomes
            .iter()
            .filter(|outcome| outcome.kind == OperationKind::Remove)
            .count();
        format!(
            "Saved {total} change(s): {removals} removal(s), {} addition(s).",
            total - removals
        )
    } else {
        format!(
            "{} of {total} operation(s) failed: {}.",
            failed.len(),
            failed.join("; ")
        )
    };

    if let RefreshState::Unconfirmed { reason } = &refresh {
        message.push_str(&format!(" Could not confirm latest state: {reason}."));
    }

    CommitSummary {
        success,
        message,
        outcomes,
        refresh,
    }
}
