//! Edit session manager: the only mutation surface for staged edits.
//!
//! # Responsibility
//! - Own the single active `EditSession` and the commit busy flag.
//! - Validate and apply staging operations atomically.
//! - Hand committed sessions to the sync engine and close them afterwards.
//!
//! # Invariants
//! - At most one session is open; `start` never replaces an open session.
//! - A rejected operation leaves the session untouched.
//! - While a commit runs, every staging/cancel/start call is rejected.
//! - Remove-then-readd of the same employee keeps both requests queued.

use crate::model::employee::{is_personnel_code, normalize_employee_id, Employee, SourceTag};
use crate::model::session::{AdditionRequest, Candidate, EditSession, RemovalRequest};
use crate::model::team::{BaselineTeam, Team};
use crate::remote::remote_spi::RosterRemote;
use crate::service::candidates::candidate_pool;
use crate::store::roster_store::RosterStore;
use crate::sync::engine::{CommitSummary, SyncEngine};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SessionResult<T> = Result<T, SessionError>;

/// Invariant violations and manager state errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Another session is open for `team_code`.
    SessionAlreadyOpen { team_code: String },
    NoActiveSession,
    TeamNotFound(String),
    EmployeeNotInSession(String),
    EmployeeAlreadyPresent(String),
    /// The team's manager cannot be staged as a member.
    EmployeeIsManager(String),
    InvalidEmployeeId(String),
    InvalidEmployeeName(String),
    CommitInProgress,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SessionAlreadyOpen { team_code } => {
                write!(f, "an edit session is already open for team {team_code}")
            }
            Self::NoActiveSession => write!(f, "no edit session is open"),
            Self::TeamNotFound(code) => write!(f, "team not found: {code}"),
            Self::EmployeeNotInSession(id) => write!(f, "employee not in session: {id}"),
            Self::EmployeeAlreadyPresent(id) => write!(f, "employee already in team: {id}"),
            Self::EmployeeIsManager(id) => write!(f, "employee {id} manages this team"),
            Self::InvalidEmployeeId(id) => write!(f, "invalid personnel code: `{id}`"),
            Self::InvalidEmployeeName(id) => write!(f, "employee name is required for {id}"),
            Self::CommitInProgress => write!(f, "a commit is in progress"),
        }
    }
}

impl Error for SessionError {}

/// Owner of the single active edit session.
#[derive(Debug, Default)]
pub struct EditSessionManager {
    active: Option<EditSession>,
    busy: bool,
}

impl EditSessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&EditSession> {
        self.active.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// Whether a commit is running.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Fails when a session is open (or committing).
    pub fn ensure_can_start(&self) -> SessionResult<()> {
        match &self.active {
            Some(session) => Err(SessionError::SessionAlreadyOpen {
                team_code: session.team_code.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Opens a session on a clone of `team`'s members.
    pub fn start(&mut self, team: &Team) -> SessionResult<&EditSession> {
        self.ensure_can_start()?;
        let session = EditSession::open(team);
        info!(
            "event=session_start module=session status=ok session_id={} team={} members={}",
            session.session_id,
            session.team_code,
            session.members.len()
        );
        Ok(self.active.insert(session))
    }

    /// Moves an employee from the working copy to `recently_removed` and
    /// queues a removal request.
    pub fn stage_removal(&mut self, employee_id: &str, reason: &str, notes: &str) -> SessionResult<()> {
        let session = self.session_mut()?;
        let id = normalize_employee_id(employee_id);
        let position = session
            .position_of(&id)
            .ok_or_else(|| SessionError::EmployeeNotInSession(id.clone()))?;

        let employee = session.members.remove(position);
        session.pending_removals.push(RemovalRequest {
            employee_id: id.clone(),
            reason: reason.trim().to_string(),
            notes: notes.trim().to_string(),
        });
        session.recently_removed.retain(|removed| removed.id != id);
        session.recently_removed.push(employee);
        info!(
            "event=stage_removal module=session status=ok session_id={} employee_id={id} pending={}",
            session.session_id,
            session.pending_count()
        );
        Ok(())
    }

    /// Appends an employee to the working copy and queues an addition
    /// request. Blank roles become the role placeholder.
    ///
    /// New ids must be personnel codes; ids removed earlier in this
    /// session are accepted as the remote reported them.
    pub fn stage_addition(
        &mut self,
        employee_id: &str,
        name: &str,
        role: &str,
        reason: &str,
        notes: &str,
    ) -> SessionResult<()> {
        let session = self.session_mut()?;
        let id = normalize_employee_id(employee_id);
        if session.contains(&id) {
            return Err(SessionError::EmployeeAlreadyPresent(id));
        }
        if session.is_manager(&id) {
            return Err(SessionError::EmployeeIsManager(id));
        }
        // Ids the remote already used are accepted back as they are.
        if session.removed_entry(&id).is_none() && !is_personnel_code(&id) {
            return Err(SessionError::InvalidEmployeeId(employee_id.trim().to_string()));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::InvalidEmployeeName(id));
        }

        session
            .members
            .push(Employee::new(&id, name, role, SourceTag::Staged));
        session.pending_additions.push(AdditionRequest {
            employee_id: id.clone(),
            name: name.to_string(),
            reason: reason.trim().to_string(),
            notes: notes.trim().to_string(),
        });
        session.recently_removed.retain(|removed| removed.id != id);
        info!(
            "event=stage_addition module=session status=ok session_id={} employee_id={id} pending={}",
            session.session_id,
            session.pending_count()
        );
        Ok(())
    }

    /// Candidate pool for the open session, recomputed on every call.
    pub fn candidates(&self, baseline_team: Option<&BaselineTeam>) -> SessionResult<Vec<Candidate>> {
        let session = self.active.as_ref().ok_or(SessionError::NoActiveSession)?;
        Ok(candidate_pool(session, baseline_team))
    }

    /// Discards the open session without touching the roster store.
    pub fn cancel(&mut self) -> SessionResult<EditSession> {
        if self.busy {
            return Err(SessionError::CommitInProgress);
        }
        let session = self.active.take().ok_or(SessionError::NoActiveSession)?;
        info!(
            "event=session_cancel module=session status=ok session_id={} discarded={}",
            session.session_id,
            session.pending_count()
        );
        Ok(session)
    }

    /// Marks the session as committing and returns a snapshot to replay.
    pub fn begin_commit(&mut self) -> SessionResult<EditSession> {
        if self.busy {
            return Err(SessionError::CommitInProgress);
        }
        let snapshot = self
            .active
            .clone()
            .ok_or(SessionError::NoActiveSession)?;
        self.busy = true;
        Ok(snapshot)
    }

    /// Clears the busy flag and closes the session.
    pub fn finish_commit(&mut self) -> Option<EditSession> {
        if !self.busy {
            warn!("event=session_finish module=session status=error reason=not_committing");
            return None;
        }
        self.busy = false;
        self.active.take()
    }

    /// Replays the open session through `remote`, refreshes its team in
    /// `store`, and closes the session regardless of per-item failures.
    pub fn commit<R: RosterRemote + ?Sized>(
        &mut self,
        remote: &R,
        store: &mut RosterStore,
    ) -> SessionResult<CommitSummary> {
        let session = self.begin_commit()?;
        let summary = SyncEngine::new(remote).commit(&session, store);
        self.finish_commit();
        Ok(summary)
    }

    fn session_mut(&mut self) -> SessionResult<&mut EditSession> {
        if self.busy {
            return Err(SessionError::CommitInProgress);
        }
        self.active.as_mut().ok_or(SessionError::NoActiveSession)
    }
}

#[cfg(test)]
mod tests {
    use super::{EditSessionManager, SessionError};
    use crate::model::employee::{Employee, SourceTag, ROLE_NOT_INFORMED};
    use crate::model::team::Team;

    fn team() -> Team {
        Team {
            id: 1,
            code: "GECOC".to_string(),
            name: "Team".to_string(),
            manager: Employee::new("F5012345", "Manager", "GERENTE", SourceTag::Remote),
            members: vec![
                Employee::new("F7023257", "Carlos", "ASSESSOR II UE", SourceTag::Remote),
                Employee::new("F6034418", "Ana", "ASSESSOR I UE", SourceTag::Remote),
            ],
        }
    }

    #[test]
    fn start_rejects_second_session_and_keeps_first() {
        let mut manager = EditSessionManager::new();
        let first_id = manager.start(&team()).expect("first start").session_id;

        let err = manager.start(&team()).expect_err("second start must fail");
        assert_eq!(
            err,
            SessionError::SessionAlreadyOpen {
                team_code: "GECOC".to_string()
            }
        );
        assert_eq!(manager.active().map(|s| s.session_id), Some(first_id));
    }

    #[test]
    fn rejected_operations_do_not_mutate_session() {
        let mut manager = EditSessionManager::new();
        manager.start(&team()).expect("start");
        let before = manager.active().cloned();

        assert_eq!(
            manager.stage_removal("F0000000", "r", ""),
            Err(SessionError::EmployeeNotInSession("F0000000".to_string()))
        );
        assert_eq!(
            manager.stage_addition("f6034418", "Ana", "", "r", ""),
            Err(SessionError::EmployeeAlreadyPresent("F6034418".to_string()))
        );
        assert_eq!(
            manager.stage_addition("12", "X", "", "r", ""),
            Err(SessionError::InvalidEmployeeId("12".to_string()))
        );
        assert_eq!(
            manager.stage_addition("F1111111", " ", "", "r", ""),
            Err(SessionError::InvalidEmployeeName("F1111111".to_string()))
        );
        assert_eq!(manager.active().cloned(), before);
    }

    #[test]
    fn readding_removed_employee_keeps_both_requests() {
        let mut manager = EditSessionManager::new();
        manager.start(&team()).expect("start");

        manager
            .stage_removal("F7023257", "perf", "")
            .expect("removal should stage");
        manager
            .stage_addition("F7023257", "Carlos", "", "back", "")
            .expect("re-addition should stage");

        let session = manager.active().expect("session open");
        assert!(session.contains("F7023257"));
        assert_eq!(session.pending_removals.len(), 1);
        assert_eq!(session.pending_additions.len(), 1);
        assert!(session.recently_removed.is_empty());
        let readded = session.members.last().expect("member appended");
        assert_eq!(readded.role, ROLE_NOT_INFORMED);
        assert_eq!(readded.source_tag, SourceTag::Staged);
    }

    #[test]
    fn manager_cannot_be_staged_as_member() {
        let mut manager = EditSessionManager::new();
        manager.start(&team()).expect("start");
        let before = manager.active().cloned();

        assert_eq!(
            manager.stage_addition("f5012345", "Manager", "", "r", ""),
            Err(SessionError::EmployeeIsManager("F5012345".to_string()))
        );
        assert_eq!(manager.active().cloned(), before);
    }

    #[test]
    fn presence_is_checked_before_id_format() {
        let mut legacy = team();
        legacy
            .members
            .push(Employee::new("1234567", "Ze", "", SourceTag::Remote));
        let mut manager = EditSessionManager::new();
        manager.start(&legacy).expect("start");

        assert_eq!(
            manager.stage_addition("1234567", "Ze", "", "r", ""),
            Err(SessionError::EmployeeAlreadyPresent("1234567".to_string()))
        );

        manager
            .stage_removal("1234567", "r", "")
            .expect("removal should stage");
        manager
            .stage_addition("1234567", "Ze", "", "back", "")
            .expect("id reported by the remote can be re-added");
        let session = manager.active().expect("session open");
        assert!(session.contains("1234567"));
        assert!(session.recently_removed.is_empty());
    }

    #[test]
    fn busy_flag_blocks_mutation_until_commit_finishes() {
        let mut manager = EditSessionManager::new();
        manager.start(&team()).expect("start");
        manager.begin_commit().expect("commit should begin");

        assert_eq!(manager.begin_commit(), Err(SessionError::CommitInProgress));
        assert_eq!(
            manager.stage_removal("F7023257", "r", ""),
            Err(SessionError::CommitInProgress)
        );
        assert_eq!(manager.cancel(), Err(SessionError::CommitInProgress));
        assert!(matches!(
            manager.start(&team()),
            Err(SessionError::SessionAlreadyOpen { .. })
        ));

        assert!(manager.finish_commit().is_some());
        assert!(!manager.is_busy());
        assert!(!manager.is_open());
    }

    #[test]
    fn operations_without_session_fail() {
        let mut manager = EditSessionManager::new();
        assert_eq!(manager.cancel(), Err(SessionError::NoActiveSession));
        assert_eq!(
            manager.stage_removal("F7023257", "r", ""),
            Err(SessionError::NoActiveSession)
        );
        assert_eq!(manager.candidates(None), Err(SessionError::NoActiveSession));
        assert_eq!(manager.begin_commit(), Err(SessionError::NoActiveSession));
    }
}
