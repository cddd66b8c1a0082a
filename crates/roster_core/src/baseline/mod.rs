//! Bundled baseline roster dataset.
//!
//! # Responsibility
//! - Parse and validate the team snapshot shipped with the crate.
//! - Answer "who should belong to this team" for fallback and
//!   reconciliation paths.
//!
//! # Invariants
//! - Baseline teams are never mutated after construction.
//! - Every baseline team satisfies `Team::is_consistent()`; team codes are
//!   unique (case-insensitive).

use crate::model::employee::{is_personnel_code, Employee, SourceTag};
use crate::model::team::{Team, TeamId};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const BUNDLED_JSON: &str = include_str!("teams.json");

static BUNDLED: Lazy<BaselineDataset> = Lazy::new(|| {
    BaselineDataset::from_json(BUNDLED_JSON).expect("bundled baseline dataset is valid")
});

/// Baseline parse/validation errors.
#[derive(Debug)]
pub enum BaselineError {
    Json(serde_json::Error),
    DuplicateTeam(String),
    ManagerListedAsMember { team: String, employee_id: String },
    DuplicateMember { team: String, employee_id: String },
    /// Baseline ids must be personnel codes.
    InvalidEmployeeId { team: String, employee_id: String },
}

impl Display for BaselineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid baseline json: {err}"),
            Self::DuplicateTeam(code) => write!(f, "baseline team listed twice: {code}"),
            Self::ManagerListedAsMember { team, employee_id } => write!(
                f,
                "baseline team {team} lists its manager {employee_id} as a member"
            ),
            Self::DuplicateMember { team, employee_id } => {
                write!(f, "baseline team {team} lists {employee_id} twice")
            }
            Self::InvalidEmployeeId { team, employee_id } => write!(
                f,
                "baseline team {team} has malformed personnel code `{employee_id}`"
            ),
        }
    }
}

impl Error for BaselineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for BaselineError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Deserialize)]
struct BaselineFile {
    teams: Vec<BaselineTeamRecord>,
}

#[derive(Deserialize)]
struct BaselineTeamRecord {
    id: TeamId,
    code: String,
    name: String,
    manager: BaselinePerson,
    #[serde(default)]
    members: Vec<BaselinePerson>,
}

#[derive(Deserialize)]
struct BaselinePerson {
    id: String,
    name: String,
    #[serde(default)]
    role: String,
}

impl BaselinePerson {
    fn into_employee(self) -> Employee {
        Employee::new(self.id, self.name, self.role, SourceTag::Baseline)
    }
}

/// Immutable reference snapshot of every team roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineDataset {
    teams: Vec<Team>,
}

impl BaselineDataset {
    /// Dataset shipped with the crate.
    pub fn bundled() -> &'static BaselineDataset {
        &BUNDLED
    }

    /// Parses and validates a dataset from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, BaselineError> {
        let file: BaselineFile = serde_json::from_str(json)?;
        let teams = file
            .teams
            .into_iter()
            .map(|record| Team {
                id: record.id,
                code: record.code.trim().to_ascii_uppercase(),
                name: record.name,
                manager: record.manager.into_employee(),
                members: record
                    .members
                    .into_iter()
                    .map(BaselinePerson::into_employee)
                    .collect(),
            })
            .collect();
        Self::from_teams(teams)
    }

    /// Builds a dataset from already-shaped teams, validating invariants.
    pub fn from_teams(teams: Vec<Team>) -> Result<Self, BaselineError> {
        let mut codes = HashSet::new();
        for team in &teams {
            if !codes.insert(team.code.to_ascii_uppercase()) {
                return Err(BaselineError::DuplicateTeam(team.code.clone()));
            }
            if let Some(person) = std::iter::once(&team.manager)
                .chain(&team.members)
                .find(|person| !is_personnel_code(&person.id))
            {
                return Err(BaselineError::InvalidEmployeeId {
                    team: team.code.clone(),
                    employee_id: person.id.clone(),
                });
            }
            let mut ids = HashSet::new();
            for member in &team.members {
                if member.id == team.manager.id {
                    return Err(BaselineError::ManagerListedAsMember {
                        team: team.code.clone(),
                        employee_id: member.id.clone(),
                    });
                }
                if !ids.insert(member.id.as_str()) {
                    return Err(BaselineError::DuplicateMember {
                        team: team.code.clone(),
                        employee_id: member.id.clone(),
                    });
                }
            }
        }
        Ok(Self { teams })
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Baseline record for one team code (case-insensitive).
    pub fn team(&self, code: &str) -> Option<&Team> {
        self.teams.iter().find(|team| team.matches_code(code))
    }

    /// Baseline manager or member `employee_id` of team `code`.
    pub fn employee(&self, code: &str, employee_id: &str) -> Option<&Employee> {
        self.team(code)?.person(employee_id)
    }

    /// Full copy of the dataset, used as displayable roster content.
    pub fn to_roster(&self) -> Vec<Team> {
        self.teams.clone()
    }
}
