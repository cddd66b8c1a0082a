//! Candidate pool for (re-)additions.
//!
//! # Invariants
//! - The pool never contains an id present in `session.members`, nor the
//!   session team's manager.
//! - Baseline-original entries come first, in baseline order, followed by
//!   session-removed entries in removal order; ids are unique.
//! - Computation is pure and must be redone whenever the pool is shown.

use crate::model::session::{Candidate, CandidateSource, EditSession};
use crate::model::team::BaselineTeam;
use std::collections::HashSet;

/// Computes employees eligible for addition to the session's team.
///
/// `baseline_team` is the baseline record for the session's team, or
/// `None` when the team is not part of the baseline.
pub fn candidate_pool(session: &EditSession, baseline_team: Option<&BaselineTeam>) -> Vec<Candidate> {
    let mut excluded = session.current_ids();
    excluded.insert(session.manager_id.as_str());
    let mut offered: HashSet<&str> = HashSet::new();
    let mut pool = Vec::new();

    let originals = baseline_team.map(|team| team.members.as_slice()).unwrap_or_default();
    for employee in originals {
        if !excluded.contains(employee.id.as_str()) && offered.insert(employee.id.as_str()) {
            pool.push(Candidate {
                employee: employee.clone(),
                source: CandidateSource::Original,
            });
        }
    }

    for employee in &session.recently_removed {
        if !excluded.contains(employee.id.as_str()) && offered.insert(employee.id.as_str()) {
            pool.push(Candidate {
                employee: employee.clone(),
                source: CandidateSource::RemovedThisSession,
            });
        }
    }

    pool
}
