//! Branch state for the assignment search: team slots under construction,
//! the choice path that fixes traversal order, and the frozen roster output.

use serde::Serialize;

use crate::overlap::OverlapIndex;
use crate::pool::CandidatePool;

use super::{MatchConfig, OverlapPolicy};

/// Path entry for a mentee that could not be placed anywhere in a branch.
pub const UNPLACED_CHOICE: u16 = u16::MAX;

/// A candidate team under construction: one navigator, an optional captain,
/// and the mentees assigned so far (pool indices).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSlot {
    pub navigator: usize,
    pub captain: Option<usize>,
    pub mentees: Vec<usize>,
}

impl TeamSlot {
    pub fn new(navigator: usize, captain: Option<usize>) -> Self {
        Self {
            navigator,
            captain,
            mentees: Vec::new(),
        }
    }

    pub fn is_full(&self, config: &MatchConfig) -> bool {
        self.mentees.len() >= config.team_capacity.1
    }

    /// Staffed means the team meets the minimum capacity bound.
    pub fn is_staffed(&self, config: &MatchConfig) -> bool {
        !self.mentees.is_empty() && self.mentees.len() >= config.team_capacity.0
    }

    /// Whether adding `mentee` keeps every placement invariant intact.
    ///
    /// Capacity first, then the captain 1-on-1 minimum when configured, then
    /// the meeting-overlap minimum under the active policy. Under the
    /// whole-team policy the pairwise cache is consulted before doing any
    /// interval intersection: the intersection can never exceed the pairwise
    /// overlap, so a failing pair rules the placement out immediately.
    pub fn can_place(
        &self,
        mentee: usize,
        pool: &CandidatePool,
        index: &OverlapIndex,
        config: &MatchConfig,
    ) -> bool {
        if self.is_full(config) {
            return false;
        }
        if let (Some(captain), Some(minimum)) = (self.captain, config.captain_min_overlap_minutes)
        {
            if index.captain_mentee(captain, mentee) < minimum {
                return false;
            }
        }
        match config.overlap_policy {
            OverlapPolicy::PairwiseNavigator => {
                index.navigator_mentee(self.navigator, mentee) >= config.min_overlap_minutes
            }
            OverlapPolicy::WholeTeam => {
                if index.navigator_mentee(self.navigator, mentee) < config.min_overlap_minutes {
                    return false;
                }
                let mut members = self.mentees.clone();
                members.push(mentee);
                index.team_overlap_minutes(pool, self.navigator, &members)
                    >= config.min_overlap_minutes
            }
        }
    }

    /// Overlap figure reported for a finished team: the whole-team
    /// intersection under the whole-team policy, the weakest pairwise
    /// navigator-mentee overlap otherwise. Empty teams report zero.
    pub fn reported_overlap_minutes(
        &self,
        pool: &CandidatePool,
        index: &OverlapIndex,
        config: &MatchConfig,
    ) -> u32 {
        if self.mentees.is_empty() {
            return 0;
        }
        match config.overlap_policy {
            OverlapPolicy::WholeTeam => {
                index.team_overlap_minutes(pool, self.navigator, &self.mentees)
            }
            OverlapPolicy::PairwiseNavigator => self
                .mentees
                .iter()
                .map(|&m| index.navigator_mentee(self.navigator, m))
                .min()
                .unwrap_or(0),
        }
    }
}

/// Build the root team slots: one per navigator, ordered by priority
/// (descending count of threshold-clearing mentees, ties by navigator id),
/// with captains attached greedily in that order by best captain-navigator
/// overlap (ties by captain id, zero-overlap captains stay unattached).
pub fn root_slots(
    pool: &CandidatePool,
    index: &OverlapIndex,
    config: &MatchConfig,
) -> Vec<TeamSlot> {
    let mut navigators: Vec<usize> = pool.navigators().to_vec();
    navigators.sort_by(|&a, &b| {
        let reach_a = index.eligible_mentee_count(pool, a, config.min_overlap_minutes);
        let reach_b = index.eligible_mentee_count(pool, b, config.min_overlap_minutes);
        reach_b
            .cmp(&reach_a)
            .then_with(|| pool.person(a).id.cmp(&pool.person(b).id))
    });

    let mut unclaimed: Vec<usize> = pool.captains().to_vec();
    navigators
        .into_iter()
        .map(|navigator| {
            let captain = unclaimed
                .iter()
                .copied()
                .max_by(|&a, &b| {
                    index
                        .captain_navigator(a, navigator)
                        .cmp(&index.captain_navigator(b, navigator))
                        // max_by keeps the later of equal elements, so order
                        // the id comparison to prefer the smaller id.
                        .then_with(|| pool.person(b).id.cmp(&pool.person(a).id))
                })
                .filter(|&c| index.captain_navigator(c, navigator) > 0);
            if let Some(chosen) = captain {
                unclaimed.retain(|&c| c != chosen);
            }
            TeamSlot::new(navigator, captain)
        })
        .collect()
}

/// Comparison key for terminal branches: staffed teams first, then mentees
/// placed, then summed scores of placed mentees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Objective {
    pub staffed_teams: usize,
    pub placed: usize,
    pub score_sum: f64,
}

impl Objective {
    pub fn better_than(&self, other: &Objective) -> bool {
        self.staffed_teams
            .cmp(&other.staffed_teams)
            .then_with(|| self.placed.cmp(&other.placed))
            .then_with(|| self.score_sum.total_cmp(&other.score_sum))
            .is_gt()
    }
}

/// One explored path of the search tree: a partial (or complete) placement of
/// the mentee list, plus the choice path identifying its position in
/// depth-first traversal order. Branches own their state; the pool and index
/// are shared read-only context.
#[derive(Debug, Clone)]
pub struct Branch {
    pub teams: Vec<TeamSlot>,
    /// Index into `pool.mentees()` of the next mentee to process.
    pub next_mentee: usize,
    pub unplaced: Vec<usize>,
    /// One entry per processed mentee: the chosen team's position, or
    /// [UNPLACED_CHOICE]. Lexicographically smaller paths were discovered
    /// earlier in traversal order, which is the documented tie-break.
    pub path: Vec<u16>,
    score_sum: f64,
}

impl Branch {
    pub fn root(teams: Vec<TeamSlot>) -> Self {
        Self {
            teams,
            next_mentee: 0,
            unplaced: Vec::new(),
            path: Vec::new(),
            score_sum: 0.0,
        }
    }

    pub fn is_terminal(&self, pool: &CandidatePool) -> bool {
        self.next_mentee >= pool.mentees().len()
    }

    /// Child state with the current mentee placed on team `team_index`.
    pub fn place(&self, team_index: usize, mentee: usize, pool: &CandidatePool) -> Branch {
        let mut child = self.clone();
        child.teams[team_index].mentees.push(mentee);
        child.next_mentee += 1;
        child.path.push(team_index as u16);
        child.score_sum += pool.person(mentee).score;
        child
    }

    /// Child state with the current mentee marked unplaced.
    pub fn skip(&self, mentee: usize) -> Branch {
        let mut child = self.clone();
        child.unplaced.push(mentee);
        child.next_mentee += 1;
        child.path.push(UNPLACED_CHOICE);
        child
    }

    /// Mark every remaining mentee unplaced. Used when the search budget ran
    /// out and the deepest partial branch stands in for a terminal one.
    pub fn complete_unplaced(mut self, pool: &CandidatePool) -> Branch {
        while self.next_mentee < pool.mentees().len() {
            let mentee = pool.mentees()[self.next_mentee];
            self.unplaced.push(mentee);
            self.next_mentee += 1;
            self.path.push(UNPLACED_CHOICE);
        }
        self
    }

    pub fn objective(&self, config: &MatchConfig) -> Objective {
        Objective {
            staffed_teams: self
                .teams
                .iter()
                .filter(|team| team.is_staffed(config))
                .count(),
            placed: self.teams.iter().map(|team| team.mentees.len()).sum(),
            score_sum: self.score_sum,
        }
    }

    /// Freeze this branch into the output roster.
    pub fn into_roster(
        self,
        pool: &CandidatePool,
        index: &OverlapIndex,
        config: &MatchConfig,
    ) -> Roster {
        let teams = self
            .teams
            .iter()
            .map(|team| TeamAssignment {
                navigator: pool.person(team.navigator).id.clone(),
                captain: team.captain.map(|c| pool.person(c).id.clone()),
                mentees: team
                    .mentees
                    .iter()
                    .map(|&m| pool.person(m).id.clone())
                    .collect(),
                staffed: team.is_staffed(config),
                overlap_minutes: team.reported_overlap_minutes(pool, index, config),
            })
            .collect();
        let unplaced = self
            .unplaced
            .iter()
            .map(|&m| pool.person(m).id.clone())
            .collect();
        Roster { teams, unplaced }
    }
}

/// A finished team in the output roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamAssignment {
    pub navigator: String,
    pub captain: Option<String>,
    pub mentees: Vec<String>,
    pub staffed: bool,
    /// Whole-team intersection minutes (or weakest pairwise overlap under the
    /// pairwise policy); zero for empty teams.
    pub overlap_minutes: u32,
}

/// The engine's final output: teams in navigator-priority order plus the
/// leftover mentees. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Roster {
    pub teams: Vec<TeamAssignment>,
    pub unplaced: Vec<String>,
}

impl Roster {
    pub fn placed_count(&self) -> usize {
        self.teams.iter().map(|team| team.mentees.len()).sum()
    }

    pub fn staffed_team_count(&self) -> usize {
        self.teams.iter().filter(|team| team.staffed).count()
    }
}
