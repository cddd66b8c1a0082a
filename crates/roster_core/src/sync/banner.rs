//! Time-limited commit summary banner.

use crate::sync::engine::CommitSummary;
use std::time::{Duration, Instant};

/// Default visibility window for a commit banner.
pub const DEFAULT_BANNER_TTL: Duration = Duration::from_secs(5);

/// Commit summary visible until its ttl elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitBanner {
    summary: CommitSummary,
    shown_at: Instant,
    ttl: Duration,
}

impl CommitBanner {
    pub fn new(summary: CommitSummary, shown_at: Instant, ttl: Duration) -> Self {
        Self {
            summary,
            shown_at,
            ttl,
        }
    }

    pub fn summary(&self) -> &CommitSummary {
        &self.summary
    }

    /// Whether the banner should no longer be shown at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.ttl
    }

    /// Time left before expiry at `now`.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.ttl
            .saturating_sub(now.saturating_duration_since(self.shown_at))
    }
}
