//! Displayed roster state.
//!
//! # Responsibility
//! - Hold the canonical `Team[]` shown to operators.
//! - Load it from the remote service, degrading to the baseline dataset.
//! - Refresh one team's members and track whether that team's roster is
//!   confirmed by the remote.
//!
//! # Invariants
//! - `load` never fails; remote problems degrade to baseline content.
//! - `load_members` and `mark_unconfirmed` touch exactly one team.
//! - Every stored team satisfies `Team::is_consistent()`.

use crate::baseline::BaselineDataset;
use crate::model::employee::Employee;
use crate::model::team::Team;
use crate::remote::normalize::{normalize_members, normalize_teams};
use crate::remote::remote_spi::RosterRemote;
use crate::remote::remote_types::RemoteError;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from single-team refreshes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The team code is not part of the displayed roster.
    UnknownTeam(String),
    Remote(RemoteError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTeam(code) => write!(f, "team not in roster: {code}"),
            Self::Remote(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownTeam(_) => None,
            Self::Remote(err) => Some(err),
        }
    }
}

impl From<RemoteError> for StoreError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

/// Where the displayed roster came from on the last `load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RosterSource {
    Remote,
    Baseline,
}

/// Whether a team's displayed members were confirmed by the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confirmation {
    Confirmed,
    /// Post-commit refresh failed; members show the last local edit.
    Unconfirmed,
}

/// In-memory roster store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterStore {
    baseline: BaselineDataset,
    teams: Vec<Team>,
    source: Option<RosterSource>,
    unconfirmed: BTreeSet<String>,
}

impl RosterStore {
    /// Creates an empty store; call `load` to populate it.
    pub fn new(baseline: BaselineDataset) -> Self {
        Self {
            baseline,
            teams: Vec::new(),
            source: None,
            unconfirmed: BTreeSet::new(),
        }
    }

    /// Creates an empty store backed by the bundled baseline.
    pub fn with_bundled_baseline() -> Self {
        Self::new(BaselineDataset::bundled().clone())
    }

    /// Replaces all teams with the remote roster, or with the baseline when
    /// the remote fails or returns no usable team.
    pub fn load<R: RosterRemote + ?Sized>(&mut self, remote: &R) -> RosterSource {
        let started_at = Instant::now();
        info!("event=roster_load module=store status=start");

        let source = match remote.list_teams() {
            Ok(records) => {
                let teams = normalize_teams(&records, &self.baseline);
                if teams.is_empty() {
                    warn!(
                        "event=roster_load module=store status=degraded fallback=baseline reason=empty_remote received={}",
                        records.len()
                    );
                    self.teams = self.baseline.to_roster();
                    RosterSource::Baseline
                } else {
                    self.teams = teams;
                    RosterSource::Remote
                }
            }
            Err(err) => {
                warn!(
                    "event=roster_load module=store status=degraded fallback=baseline error_code={} retryable={}",
                    err.code, err.retryable
                );
                self.teams = self.baseline.to_roster();
                RosterSource::Baseline
            }
        };

        self.source = Some(source);
        self.unconfirmed.clear();
        info!(
            "event=roster_load module=store status=ok source={source:?} teams={} duration_ms={}",
            self.teams.len(),
            started_at.elapsed().as_millis()
        );
        source
    }

    /// Fetches authoritative members of one team and replaces that team's
    /// members. Clears the team's unconfirmed flag on success.
    ///
    /// Roles missing from the remote are resolved through the baseline
    /// entry for the same employee, then the placeholder.
    pub fn load_members<R: RosterRemote + ?Sized>(
        &mut self,
        remote: &R,
        team_code: &str,
    ) -> StoreResult<&Team> {
        let index = self.index_of(team_code)?;
        let code = self.teams[index].code.clone();

        let records = remote.list_members(&code).map_err(|err| {
            warn!(
                "event=load_members module=store status=error team={code} error_code={}",
                err.code
            );
            err
        })?;
        let members = normalize_members(&records, self.baseline.team(&code));

        let team = &mut self.teams[index];
        team.members = members;
        let dropped = team.enforce_invariants();
        self.unconfirmed.remove(&code);
        info!(
            "event=load_members module=store status=ok team={code} members={} dropped={dropped}",
            self.teams[index].members.len()
        );
        Ok(&self.teams[index])
    }

    /// Shows `members` as the team's roster and flags it unconfirmed.
    pub fn mark_unconfirmed(&mut self, team_code: &str, members: Vec<Employee>) -> StoreResult<()> {
        let index = self.index_of(team_code)?;
        let team = &mut self.teams[index];
        team.members = members;
        team.enforce_invariants();
        let code = team.code.clone();
        warn!("event=roster_unconfirmed module=store status=degraded team={code}");
        self.unconfirmed.insert(code);
        Ok(())
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Team by code (case-insensitive).
    pub fn team(&self, code: &str) -> Option<&Team> {
        self.teams.iter().find(|team| team.matches_code(code))
    }

    pub fn source(&self) -> Option<RosterSource> {
        self.source
    }

    pub fn baseline(&self) -> &BaselineDataset {
        &self.baseline
    }

    pub fn confirmation(&self, team_code: &str) -> Confirmation {
        let code = team_code.trim().to_ascii_uppercase();
        if self.unconfirmed.contains(&code) {
            Confirmation::Unconfirmed
        } else {
            Confirmation::Confirmed
        }
    }

    fn index_of(&self, team_code: &str) -> StoreResult<usize> {
        self.teams
            .iter()
            .position(|team| team.matches_code(team_code))
            .ok_or_else(|| StoreError::UnknownTeam(team_code.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Confirmation, RosterStore, StoreError};
    use crate::model::employee::{Employee, SourceTag};
    use crate::model::session::{AdditionRequest, RemovalRequest};
    use crate::remote::remote_spi::RosterRemote;
    use crate::remote::remote_types::{RemoteError, RemoteOperation, RemoteResult};
    use serde_json::Value;

    struct UnreachableRemote;

    impl RosterRemote for UnreachableRemote {
        fn list_teams(&self) -> RemoteResult<Vec<Value>> {
            Err(RemoteError::network(RemoteOperation::ListTeams, "down"))
        }

        fn list_members(&self, _team_code: &str) -> RemoteResult<Vec<Value>> {
            Err(RemoteError::network(RemoteOperation::ListMembers, "down"))
        }

        fn add_employee(&self, _team_code: &str, _request: &AdditionRequest) -> RemoteResult<()> {
            Err(RemoteError::network(RemoteOperation::AddEmployee, "down"))
        }

        fn remove_employee(
            &self,
            _team_code: &str,
            _request: &RemovalRequest,
        ) -> RemoteResult<()> {
            Err(RemoteError::network(RemoteOperation::RemoveEmployee, "down"))
        }

        fn change_history(&self) -> RemoteResult<Vec<Value>> {
            Err(RemoteError::network(RemoteOperation::ChangeHistory, "down"))
        }
    }

    #[test]
    fn new_store_is_empty_until_loaded() {
        let store = RosterStore::with_bundled_baseline();
        assert!(store.teams().is_empty());
        assert!(store.source().is_none());
    }

    #[test]
    fn unknown_team_is_rejected_without_remote_call() {
        let mut store = RosterStore::with_bundled_baseline();
        store.load(&UnreachableRemote);
        let err = store
            .load_members(&UnreachableRemote, "NOPE")
            .expect_err("unknown team must fail");
        assert_eq!(err, StoreError::UnknownTeam("NOPE".to_string()));
    }

    #[test]
    fn mark_unconfirmed_flags_only_that_team() {
        let mut store = RosterStore::with_bundled_baseline();
        store.load(&UnreachableRemote);
        let members = vec![Employee::new("F7023257", "X", "Y", SourceTag::Staged)];

        store
            .mark_unconfirmed("gecoc", members.clone())
            .expect("known team should accept members");
        assert_eq!(store.confirmation("GECOC"), Confirmation::Unconfirmed);
        assert_eq!(store.confirmation("GEMOD"), Confirmation::Confirmed);
        assert_eq!(store.team("GECOC").map(|t| t.members.clone()), Some(members));

        store.load(&UnreachableRemote);
        assert_eq!(store.confirmation("GECOC"), Confirmation::Confirmed);
    }
}
