//! Commit pipeline: remote replay and the transient result banner.
//!
//! # Responsibility
//! - Apply committed edit sessions to the remote with per-item failure
//!   tolerance (`engine`).
//! - Hold the time-limited summary shown after a commit (`banner`).

pub mod banner;
pub mod engine;
