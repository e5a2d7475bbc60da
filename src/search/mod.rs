//! Team-assignment search: configuration, the matching entry points, and the
//! run-level error taxonomy.
//!
//! The engine is a synchronous batch computation: build the pool, build the
//! overlap index, explore placements, validate the winning roster, report.
//! A budget-limited run is not an error: it returns the best branch found,
//! flagged in the run report. A roster that fails validation is a hard error
//! (it means the search broke its own guarantees) and aborts the run.

pub mod explorer;
pub mod state;

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::overlap::OverlapIndex;
use crate::parallel::WorkerPool;
use crate::pool::{CandidatePool, InputError, Person};
use crate::report::RunReport;
use crate::validate::{validate_roster, Invariant, ValidationReport};

pub use explorer::SearchOutcome;
pub use state::{Roster, TeamAssignment, TeamSlot};

/// How the minimum-overlap invariant is checked when a mentee joins a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlapPolicy {
    /// All current members (navigator plus every assigned mentee) must share
    /// the minimum simultaneously-free window. The default: teams meet
    /// together, and each added member can only shrink the common window.
    #[serde(rename = "whole-team-intersection")]
    WholeTeam,
    /// Only the navigator-mentee pairwise overlap is checked.
    #[serde(rename = "pairwise-navigator-only")]
    PairwiseNavigator,
}

impl Default for OverlapPolicy {
    fn default() -> Self {
        Self::WholeTeam
    }
}

/// Recognized configuration surface of the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    /// Minimum weekly meeting overlap, in minutes. Default 300 (5 hours).
    pub min_overlap_minutes: u32,
    /// Minimum captain-mentee 1-on-1 overlap, in minutes; `None` disables the
    /// captain check. Default 180 (3 hours).
    pub captain_min_overlap_minutes: Option<u32>,
    /// Team capacity bounds (min, max) in mentees. A team is "staffed" at the
    /// minimum. Default (3, 3).
    pub team_capacity: (usize, usize),
    pub overlap_policy: OverlapPolicy,
    /// Ceiling on visited branch states; `None` means unbounded. Default
    /// 200_000. Exhaustion is reported in the run report, never silent.
    pub branch_limit: Option<usize>,
    /// Wall-clock budget for the exploration phase. Default none.
    pub time_budget: Option<Duration>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_overlap_minutes: 300,
            captain_min_overlap_minutes: Some(180),
            team_capacity: (3, 3),
            overlap_policy: OverlapPolicy::default(),
            branch_limit: Some(200_000),
            time_budget: None,
        }
    }
}

/// Run-aborting failures. Budget exhaustion is deliberately absent: it is a
/// flagged result, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Malformed candidate data, rejected before the search started.
    Input(InputError),
    /// The produced roster violated a hard invariant: a bug in the search
    /// itself, never accepted silently.
    Validation(ValidationReport),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(err) => write!(f, "input error: {err}"),
            Self::Validation(report) => write!(
                f,
                "roster validation failed with {} violation(s): {}",
                report.violations.len(),
                report
                    .violations
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join("; ")
            ),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<InputError> for EngineError {
    fn from(err: InputError) -> Self {
        Self::Input(err)
    }
}

/// The engine's output contract: the frozen roster plus the run report.
#[derive(Debug, Clone, Serialize)]
pub struct MatchOutcome {
    pub roster: Roster,
    pub report: RunReport,
}

/// Run the matching engine serially.
pub fn run_matching(people: Vec<Person>, config: &MatchConfig) -> Result<MatchOutcome, EngineError> {
    run_with_explorer(people, config, explorer::explore)
}

/// Run the matching engine with branches fanned out across a worker pool.
pub fn run_matching_with_pool(
    people: Vec<Person>,
    config: &MatchConfig,
    workers: &WorkerPool,
) -> Result<MatchOutcome, EngineError> {
    run_with_explorer(people, config, |pool, index, config| {
        explorer::explore_parallel(pool, index, config, workers)
    })
}

fn run_with_explorer<F>(
    people: Vec<Person>,
    config: &MatchConfig,
    explore: F,
) -> Result<MatchOutcome, EngineError>
where
    F: FnOnce(&CandidatePool, &OverlapIndex, &MatchConfig) -> SearchOutcome,
{
    let pool = CandidatePool::build(people)?;
    let index = OverlapIndex::build(&pool);

    let started = Instant::now();
    let outcome = explore(&pool, &index, config);
    let elapsed = started.elapsed();

    let roster = outcome.best.into_roster(&pool, &index, config);
    let mut validation = validate_roster(&roster, &pool, &index, config);
    if outcome.budget_exceeded {
        // Rank ordering holds by construction only when exploration ran to
        // completion; a budget cut leaves unprocessed mentees unplaced even
        // where seats remain. The result is flagged, not rejected.
        validation
            .violations
            .retain(|violation| violation.invariant != Invariant::RankOrder);
    }
    if !validation.passed() {
        return Err(EngineError::Validation(validation));
    }

    let report = RunReport::new(
        &roster,
        outcome.branches_explored,
        outcome.budget_exceeded,
        elapsed,
    );
    Ok(MatchOutcome { roster, report })
}
