//! Post-hoc roster validation against the hard invariants.
//!
//! The validator only reports; it never repairs. A clean report is the
//! acceptance gate before a roster is handed to callers; a dirty one means
//! the search broke its own guarantees and the run is aborted.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::overlap::OverlapIndex;
use crate::pool::CandidatePool;
use crate::search::state::TeamSlot;
use crate::search::{MatchConfig, Roster};

/// The hard invariants a finished roster is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Invariant {
    /// No person appears in more than one team, or both placed and unplaced.
    DuplicateMembership,
    /// No team holds more mentees than the capacity maximum.
    CapacityExceeded,
    /// Every staffed team meets the minimum overlap under the active policy.
    InsufficientOverlap,
    /// No unplaced mentee was passed over while a feasible placement existed
    /// that only a lower-priority mentee occupies (or spare capacity allows).
    RankOrder,
    /// A roster id that does not resolve to a person in the pool snapshot.
    UnknownPerson,
}

impl Invariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateMembership => "duplicate-membership",
            Self::CapacityExceeded => "capacity-exceeded",
            Self::InsufficientOverlap => "insufficient-overlap",
            Self::RankOrder => "rank-order",
            Self::UnknownPerson => "unknown-person",
        }
    }
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One invariant breach: which rule, which entity, and what happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub invariant: Invariant,
    pub entity: String,
    pub detail: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.invariant, self.entity, self.detail)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn push(&mut self, invariant: Invariant, entity: impl Into<String>, detail: impl Into<String>) {
        self.violations.push(Violation {
            invariant,
            entity: entity.into(),
            detail: detail.into(),
        });
    }

    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check a finished roster against every hard invariant. An empty roster
/// (all teams empty, everyone unplaced) violates nothing.
pub fn validate_roster(
    roster: &Roster,
    pool: &CandidatePool,
    index: &OverlapIndex,
    config: &MatchConfig,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_duplicates(roster, &mut report);
    let slots = resolve_slots(roster, pool, &mut report);
    check_capacity(roster, config, &mut report);
    check_overlap(&slots, pool, index, config, &mut report);
    check_rank_order(roster, &slots, pool, index, config, &mut report);

    report
}

fn check_duplicates(roster: &Roster, report: &mut ValidationReport) {
    let mut seen: HashSet<&str> = HashSet::new();
    for team in &roster.teams {
        for mentee in &team.mentees {
            if !seen.insert(mentee.as_str()) {
                report.push(
                    Invariant::DuplicateMembership,
                    mentee.clone(),
                    "appears in more than one team",
                );
            }
        }
    }
    for mentee in &roster.unplaced {
        if !seen.insert(mentee.as_str()) {
            report.push(
                Invariant::DuplicateMembership,
                mentee.clone(),
                "is both placed and unplaced",
            );
        }
    }
}

fn check_capacity(roster: &Roster, config: &MatchConfig, report: &mut ValidationReport) {
    for team in &roster.teams {
        if team.mentees.len() > config.team_capacity.1 {
            report.push(
                Invariant::CapacityExceeded,
                team.navigator.clone(),
                format!(
                    "{} mentees exceeds the capacity maximum of {}",
                    team.mentees.len(),
                    config.team_capacity.1
                ),
            );
        }
    }
}

/// Rebuild pool-index team slots from the roster's ids so the placement
/// feasibility logic can be reused verbatim. Unresolvable ids are reported
/// and skipped.
fn resolve_slots(
    roster: &Roster,
    pool: &CandidatePool,
    report: &mut ValidationReport,
) -> Vec<TeamSlot> {
    let mut resolve = |id: &str| -> Option<usize> {
        let found = pool.find(id);
        if found.is_none() {
            report.push(
                Invariant::UnknownPerson,
                id.to_string(),
                "not in the candidate pool snapshot",
            );
        }
        found
    };

    roster
        .teams
        .iter()
        .filter_map(|team| {
            let navigator = resolve(&team.navigator)?;
            let captain = team.captain.as_deref().and_then(&mut resolve);
            let mentees = team
                .mentees
                .iter()
                .filter_map(|id| resolve(id))
                .collect::<Vec<_>>();
            Some(TeamSlot {
                navigator,
                captain,
                mentees,
            })
        })
        .collect()
}

fn check_overlap(
    slots: &[TeamSlot],
    pool: &CandidatePool,
    index: &OverlapIndex,
    config: &MatchConfig,
    report: &mut ValidationReport,
) {
    for slot in slots {
        if slot.mentees.is_empty() {
            continue;
        }
        let navigator = pool.person(slot.navigator).id.clone();
        let overlap = slot.reported_overlap_minutes(pool, index, config);
        if overlap < config.min_overlap_minutes {
            report.push(
                Invariant::InsufficientOverlap,
                navigator.clone(),
                format!(
                    "team overlap of {overlap} minutes is below the minimum of {}",
                    config.min_overlap_minutes
                ),
            );
        }
        if let (Some(captain), Some(minimum)) = (slot.captain, config.captain_min_overlap_minutes)
        {
            for &mentee in &slot.mentees {
                let pair = index.captain_mentee(captain, mentee);
                if pair < minimum {
                    report.push(
                        Invariant::InsufficientOverlap,
                        pool.person(mentee).id.clone(),
                        format!(
                            "captain overlap of {pair} minutes is below the minimum of {minimum}"
                        ),
                    );
                }
            }
        }
    }
}

/// Rank ordering: an unplaced mentee must have had zero feasible placements
/// against the final roster. Feasible means either a team with spare
/// capacity would accept them, or they could replace a placed mentee of
/// strictly lower priority without breaking the overlap invariants.
fn check_rank_order(
    roster: &Roster,
    slots: &[TeamSlot],
    pool: &CandidatePool,
    index: &OverlapIndex,
    config: &MatchConfig,
    report: &mut ValidationReport,
) {
    for id in &roster.unplaced {
        let Some(unplaced) = pool.find(id) else {
            continue;
        };
        let Some(priority) = pool.mentee_priority(unplaced) else {
            continue;
        };

        for slot in slots {
            if slot.can_place(unplaced, pool, index, config) {
                report.push(
                    Invariant::RankOrder,
                    id.clone(),
                    format!(
                        "left unplaced although team '{}' had a feasible opening",
                        pool.person(slot.navigator).id
                    ),
                );
                break;
            }
            let displaced = slot.mentees.iter().copied().find(|&placed| {
                let lower_priority = pool
                    .mentee_priority(placed)
                    .is_some_and(|p| p > priority);
                if !lower_priority {
                    return false;
                }
                let mut reduced = slot.clone();
                reduced.mentees.retain(|&m| m != placed);
                reduced.can_place(unplaced, pool, index, config)
            });
            if let Some(placed) = displaced {
                report.push(
                    Invariant::RankOrder,
                    id.clone(),
                    format!(
                        "left unplaced although lower-priority '{}' holds a feasible seat on team '{}'",
                        pool.person(placed).id,
                        pool.person(slot.navigator).id
                    ),
                );
                break;
            }
        }
    }
}
