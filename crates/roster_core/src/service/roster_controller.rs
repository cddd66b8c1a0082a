//! Roster controller: the single owner of roster view state.
//!
//! # Responsibility
//! - Own the remote adapter, roster store, session manager and commit
//!   banner, and expose the use-case operations the dashboard calls.
//! - Fill blank addition fields from the session's removals or the
//!   baseline before staging.
//!
//! # Invariants
//! - All session mutation goes through `EditSessionManager`.
//! - `cancel_edit` never touches the roster store.

use crate::baseline::BaselineDataset;
use crate::model::employee::normalize_employee_id;
use crate::model::history::HistoryEntry;
use crate::model::session::{Candidate, EditSession};
use crate::model::team::Team;
use crate::remote::normalize::resolve_role;
use crate::remote::remote_spi::RosterRemote;
use crate::remote::remote_types::RemoteResult;
use crate::service::edit_session::{EditSessionManager, SessionError, SessionResult};
use crate::service::history_service::fetch_history;
use crate::store::roster_store::{RosterSource, RosterStore};
use crate::sync::banner::{CommitBanner, DEFAULT_BANNER_TTL};
use crate::sync::engine::CommitSummary;
use log::info;
use std::time::{Duration, Instant};

/// Addition input as typed by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdditionInput {
    pub employee_id: String,
    /// Blank means "use the baseline name".
    pub name: String,
    /// Blank means "use the baseline role, else the placeholder".
    pub role: String,
    pub reason: String,
    pub notes: String,
}

/// Use-case facade over store, session manager and remote.
pub struct RosterController<R: RosterRemote> {
    remote: R,
    store: RosterStore,
    sessions: EditSessionManager,
    banner: Option<CommitBanner>,
    banner_ttl: Duration,
}

impl<R: RosterRemote> RosterController<R> {
    /// Creates a controller with an empty store; call `load` next.
    pub fn new(remote: R, baseline: BaselineDataset) -> Self {
        Self {
            remote,
            store: RosterStore::new(baseline),
            sessions: EditSessionManager::new(),
            banner: None,
            banner_ttl: DEFAULT_BANNER_TTL,
        }
    }

    pub fn with_banner_ttl(mut self, ttl: Duration) -> Self {
        self.banner_ttl = ttl;
        self
    }

    /// Initial roster load; degrades to the baseline on remote failure.
    pub fn load(&mut self) -> RosterSource {
        self.store.load(&self.remote)
    }

    /// Manual refresh of every team. An open session keeps its working
    /// copy; only the displayed roster is replaced.
    pub fn sync_now(&mut self) -> RosterSource {
        info!(
            "event=manual_sync module=service status=start session_open={} committing={}",
            self.sessions.is_open(),
            self.sessions.is_busy()
        );
        self.load()
    }

    pub fn teams(&self) -> &[Team] {
        self.store.teams()
    }

    pub fn store(&self) -> &RosterStore {
        &self.store
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.sessions.active()
    }

    pub fn is_committing(&self) -> bool {
        self.sessions.is_busy()
    }

    /// Opens an edit session for the displayed team `team_code`.
    pub fn start_edit(&mut self, team_code: &str) -> SessionResult<&EditSession> {
        self.sessions.ensure_can_start()?;
        let team = self
            .store
            .team(team_code)
            .ok_or_else(|| SessionError::TeamNotFound(team_code.trim().to_string()))?;
        self.sessions.start(team)
    }

    pub fn stage_removal(&mut self, employee_id: &str, reason: &str, notes: &str) -> SessionResult<()> {
        self.sessions.stage_removal(employee_id, reason, notes)
    }

    /// Stages an addition. Blank name and role are completed from the
    /// employee's entry in this session's removals, then from the team's
    /// baseline entry; a role still missing becomes the placeholder.
    pub fn stage_addition(&mut self, input: &AdditionInput) -> SessionResult<()> {
        let session = self.sessions.active().ok_or(SessionError::NoActiveSession)?;
        let id = normalize_employee_id(&input.employee_id);
        let removed = session.removed_entry(&id);
        let baseline_team = self.store.baseline().team(&session.team_code);

        let name = match input.name.trim() {
            "" => removed
                .or_else(|| baseline_team.and_then(|team| team.person(&id)))
                .map(|person| person.name.clone())
                .unwrap_or_default(),
            typed => typed.to_string(),
        };
        let role = match (input.role.trim(), removed) {
            ("", Some(person)) if person.has_informed_role() => person.role.clone(),
            (typed, _) => resolve_role(Some(typed), &id, baseline_team),
        };

        self.sessions
            .stage_addition(&id, &name, &role, &input.reason, &input.notes)
    }

    /// Candidate pool for the open session; recomputed on each call.
    pub fn candidates(&self) -> SessionResult<Vec<Candidate>> {
        let session = self.sessions.active().ok_or(SessionError::NoActiveSession)?;
        self.sessions
            .candidates(self.store.baseline().team(&session.team_code))
    }

    /// Discards the open session.
    pub fn cancel_edit(&mut self) -> SessionResult<()> {
        self.sessions.cancel().map(|_| ())
    }

    /// Commits the open session and shows its summary banner from `now`.
    pub fn commit(&mut self, now: Instant) -> SessionResult<CommitSummary> {
        let summary = self.sessions.commit(&self.remote, &mut self.store)?;
        self.banner = Some(CommitBanner::new(summary.clone(), now, self.banner_ttl));
        Ok(summary)
    }

    /// Live commit banner at `now`; expired banners are cleared.
    pub fn banner(&mut self, now: Instant) -> Option<&CommitBanner> {
        if self
            .banner
            .as_ref()
            .is_some_and(|banner| banner.is_expired(now))
        {
            self.banner = None;
        }
        self.banner.as_ref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// Remote change log, normalized and in remote order.
    pub fn history(&self) -> RemoteResult<Vec<HistoryEntry>> {
        fetch_history(&self.remote)
    }
}
