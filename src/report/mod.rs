//! Run report emitted alongside every roster: how much of the tree was
//! explored, whether the budget cut the run short, and headline counts.
//! Downstream consumers use the flags to tell an exhaustive result from a
//! best-effort one.

use std::time::Duration;

use serde::Serialize;

use crate::search::Roster;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Unique id for this run, for cross-referencing logs and exports.
    pub run_id: String,
    /// UTC timestamp of when the run finished.
    pub generated_at: String,
    /// Branch states visited during exploration.
    pub branches_explored: usize,
    /// True when the branch ceiling or wall-clock budget stopped the search;
    /// the roster is then the best found so far, possibly suboptimal.
    pub budget_exceeded: bool,
    pub elapsed_ms: u64,
    pub teams_staffed: usize,
    pub mentees_placed: usize,
    pub mentees_unplaced: usize,
    /// Always true on a successful run: a failing validation aborts instead.
    pub validation_passed: bool,
}

impl RunReport {
    pub fn new(
        roster: &Roster,
        branches_explored: usize,
        budget_exceeded: bool,
        elapsed: Duration,
    ) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            generated_at: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            branches_explored,
            budget_exceeded,
            elapsed_ms: elapsed.as_millis() as u64,
            teams_staffed: roster.staffed_team_count(),
            mentees_placed: roster.placed_count(),
            mentees_unplaced: roster.unplaced.len(),
            validation_passed: true,
        }
    }
}
