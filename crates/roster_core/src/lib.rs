//! Team roster editing and reconciliation core.
//! This crate owns roster normalization, edit sessions and remote sync.

pub mod baseline;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod remote;
pub mod service;
pub mod settings;
pub mod store;
pub mod sync;

pub use baseline::{BaselineDataset, BaselineError};
pub use config::{ConfigError, RosterConfig};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::employee::{Employee, EmployeeId, SourceTag, ROLE_NOT_INFORMED};
pub use model::history::{ChangeType, HistoryEntry};
pub use model::session::{AdditionRequest, Candidate, CandidateSource, EditSession, RemovalRequest};
pub use model::team::{BaselineTeam, Team, TeamId};
#[cfg(feature = "http-remote")]
pub use remote::http::HttpRosterRemote;
pub use remote::remote_spi::RosterRemote;
pub use remote::remote_types::{RemoteError, RemoteOperation, RemoteResult};
pub use service::edit_session::{EditSessionManager, SessionError, SessionResult};
pub use service::roster_controller::{AdditionInput, RosterController};
pub use settings::workflow_settings::{SettingsError, WorkflowSettings};
pub use store::roster_store::{Confirmation, RosterSource, RosterStore, StoreError};
pub use sync::banner::CommitBanner;
pub use sync::engine::{CommitSummary, OperationKind, OperationOutcome, RefreshState, SyncEngine};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
