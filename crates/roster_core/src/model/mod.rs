//! Canonical roster data model.
//!
//! # Responsibility
//! - Define the shapes every other layer works with after ingress
//!   normalization (`Employee`, `Team`, `EditSession`, `HistoryEntry`).
//! - Keep all models serializable so session state can be snapshotted.
//!
//! # Invariants
//! - `Employee::id` is the identity key across baseline, remote and session
//!   collections.
//! - A team's manager never appears in its `members`.

pub mod employee;
pub mod history;
pub mod session;
pub mod team;
