//! Boundary with the remote system of record.
//!
//! # Responsibility
//! - Define the synchronous SPI consumed by store, sync engine and history
//!   viewer (`RosterRemote`).
//! - Normalize raw remote records into canonical models exactly once, on
//!   ingress.
//! - Provide the HTTP adapter used in production builds.
//!
//! # Invariants
//! - Code outside this module only sees canonical `Employee`/`Team`/
//!   `HistoryEntry` shapes, never raw field-name variants.

#[cfg(feature = "http-remote")]
pub mod http;
pub mod normalize;
pub mod remote_spi;
pub mod remote_types;
