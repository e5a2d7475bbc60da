//! Worklist exploration with a branch/time budget and deterministic
//! best-branch selection.
//!
//! The tree is walked with an explicit stack instead of recursion so memory
//! stays bounded and branches can be fanned out across workers. Children are
//! pushed in reverse team order, so the stack pops them in team order and the
//! lexicographic choice path of a branch equals its discovery order: when two
//! terminal branches tie on the objective, the smaller path wins, serial or
//! parallel alike.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;

use crate::overlap::OverlapIndex;
use crate::parallel::{batch_ranges, WorkerPool};
use crate::pool::CandidatePool;

use super::state::{root_slots, Branch};
use super::MatchConfig;

/// Result of one exploration run, before validation and reporting.
#[derive(Debug)]
pub struct SearchOutcome {
    pub best: Branch,
    pub branches_explored: usize,
    pub budget_exceeded: bool,
}

/// Shared exploration budget. Charged once per visited branch state; the
/// first failed charge flips the exceeded flag for the whole run.
struct Budget {
    visited: AtomicUsize,
    exceeded: AtomicBool,
    branch_limit: Option<usize>,
    deadline: Option<Instant>,
}

impl Budget {
    fn new(config: &MatchConfig) -> Self {
        Self {
            visited: AtomicUsize::new(0),
            exceeded: AtomicBool::new(false),
            branch_limit: config.branch_limit,
            deadline: config.time_budget.map(|budget| Instant::now() + budget),
        }
    }

    fn charge(&self) -> bool {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                self.exceeded.store(true, Ordering::Relaxed);
                return false;
            }
        }
        let spent = self.visited.fetch_add(1, Ordering::Relaxed);
        if let Some(limit) = self.branch_limit {
            if spent >= limit {
                self.exceeded.store(true, Ordering::Relaxed);
                // Keep the counter at the number actually explored.
                self.visited.fetch_sub(1, Ordering::Relaxed);
                return false;
            }
        }
        true
    }
}

/// Best branches seen by one worker: the best terminal, and the deepest
/// partial as a fallback when the budget cut exploration short.
#[derive(Debug, Default)]
struct LocalBest {
    terminal: Option<Branch>,
    deepest: Option<Branch>,
}

impl LocalBest {
    fn offer_terminal(&mut self, branch: Branch, config: &MatchConfig) {
        let replace = match &self.terminal {
            None => true,
            Some(current) => {
                let challenger = branch.objective(config);
                let incumbent = current.objective(config);
                challenger.better_than(&incumbent)
                    || (!incumbent.better_than(&challenger) && branch.path < current.path)
            }
        };
        if replace {
            self.terminal = Some(branch);
        }
    }

    fn offer_deepest(&mut self, branch: &Branch) {
        let replace = match &self.deepest {
            None => true,
            Some(current) => {
                branch.next_mentee > current.next_mentee
                    || (branch.next_mentee == current.next_mentee && branch.path < current.path)
            }
        };
        if replace {
            self.deepest = Some(branch.clone());
        }
    }

    fn merge(mut self, other: LocalBest, config: &MatchConfig) -> LocalBest {
        if let Some(branch) = other.terminal {
            self.offer_terminal(branch, config);
        }
        if let Some(branch) = other.deepest {
            self.offer_deepest(&branch);
        }
        self
    }
}

/// Feasible children of a non-terminal branch, in team order. A mentee with
/// no feasible team yields the single unplaced child.
fn expand(
    branch: &Branch,
    pool: &CandidatePool,
    index: &OverlapIndex,
    config: &MatchConfig,
) -> Vec<Branch> {
    let mentee = pool.mentees()[branch.next_mentee];
    let mut children = Vec::new();
    for (team_index, team) in branch.teams.iter().enumerate() {
        if team.can_place(mentee, pool, index, config) {
            children.push(branch.place(team_index, mentee, pool));
        }
    }
    if children.is_empty() {
        children.push(branch.skip(mentee));
    }
    children
}

/// Depth-first walk from one seed branch, charging the shared budget.
fn walk(
    seed: Branch,
    pool: &CandidatePool,
    index: &OverlapIndex,
    config: &MatchConfig,
    budget: &Budget,
) -> LocalBest {
    let mut best = LocalBest::default();
    let mut stack = vec![seed];

    while let Some(branch) = stack.pop() {
        best.offer_deepest(&branch);
        if !budget.charge() {
            break;
        }
        if branch.is_terminal(pool) {
            best.offer_terminal(branch, config);
            continue;
        }
        let mut children = expand(&branch, pool, index, config);
        children.reverse();
        stack.extend(children);
    }

    best
}

fn finish(best: LocalBest, pool: &CandidatePool, budget: &Budget) -> SearchOutcome {
    let LocalBest { terminal, deepest } = best;
    // The root is always visited, so `deepest` is populated even when the
    // budget was zero.
    let best = terminal.unwrap_or_else(|| {
        deepest
            .expect("exploration visits at least the root branch")
            .complete_unplaced(pool)
    });
    SearchOutcome {
        best,
        branches_explored: budget.visited.load(Ordering::Relaxed),
        budget_exceeded: budget.exceeded.load(Ordering::Relaxed),
    }
}

/// Serial exploration.
pub fn explore(pool: &CandidatePool, index: &OverlapIndex, config: &MatchConfig) -> SearchOutcome {
    let budget = Budget::new(config);
    let root = Branch::root(root_slots(pool, index, config));
    let best = walk(root, pool, index, config, &budget);
    finish(best, pool, &budget)
}

/// Parallel exploration: a breadth-first frontier is grown until there is
/// enough fan-out, then frontier branches are walked independently across
/// the worker pool. Branches share only the read-only pool and index; each
/// owns its partial state, so no locking is involved. Selection stays
/// deterministic via the choice-path tie-break as long as the budget is not
/// hit.
pub fn explore_parallel(
    pool: &CandidatePool,
    index: &OverlapIndex,
    config: &MatchConfig,
    workers: &WorkerPool,
) -> SearchOutcome {
    let budget = Budget::new(config);
    let root = Branch::root(root_slots(pool, index, config));

    workers.install(|| {
        let target = (rayon::current_num_threads() * 8).clamp(16, 1024);
        let mut frontier = vec![root];

        // Grow the frontier one mentee layer at a time. Terminal branches are
        // carried along unexpanded; each expansion is charged to the budget.
        while frontier.len() < target
            && frontier.iter().any(|branch| !branch.is_terminal(pool))
        {
            let mut next = Vec::with_capacity(frontier.len() * 2);
            let mut out_of_budget = false;
            for branch in frontier {
                if branch.is_terminal(pool) || out_of_budget {
                    next.push(branch);
                    continue;
                }
                if !budget.charge() {
                    out_of_budget = true;
                    next.push(branch);
                    continue;
                }
                next.extend(expand(&branch, pool, index, config));
            }
            frontier = next;
            if out_of_budget {
                break;
            }
        }

        let chunks = batch_ranges(frontier.len(), rayon::current_num_threads() * 4);
        let best = chunks
            .into_par_iter()
            .map(|(start, end)| {
                frontier[start..end]
                    .iter()
                    .map(|seed| walk(seed.clone(), pool, index, config, &budget))
                    .fold(LocalBest::default(), |acc, local| acc.merge(local, config))
            })
            .reduce(LocalBest::default, |a, b| a.merge(b, config));

        finish(best, pool, &budget)
    })
}

#[cfg(test)]
mod tests {
    use super::{explore, expand};
    use crate::availability::{Availability, TimeSlot, Weekday};
    use crate::overlap::OverlapIndex;
    use crate::pool::{CandidatePool, Person, Role};
    use crate::search::state::Branch;
    use crate::search::state::root_slots;
    use crate::search::MatchConfig;

    fn person(id: &str, role: Role, slots: Vec<TimeSlot>) -> Person {
        Person {
            id: id.to_string(),
            role,
            score: 1.0,
            eligible: true,
            availability: Availability::new(slots),
        }
    }

    fn two_team_pool() -> CandidatePool {
        CandidatePool::build(vec![
            person(
                "nav-a",
                Role::Navigator,
                vec![TimeSlot::new(Weekday::Mon, 0, 720)],
            ),
            person(
                "nav-b",
                Role::Navigator,
                vec![TimeSlot::new(Weekday::Tue, 0, 720)],
            ),
            person(
                "m1",
                Role::Mentee { rank: 1 },
                vec![
                    TimeSlot::new(Weekday::Mon, 0, 720),
                    TimeSlot::new(Weekday::Tue, 0, 720),
                ],
            ),
            person(
                "m2",
                Role::Mentee { rank: 2 },
                vec![TimeSlot::new(Weekday::Wed, 0, 720)],
            ),
        ])
        .unwrap()
    }

    fn config() -> MatchConfig {
        MatchConfig {
            min_overlap_minutes: 60,
            captain_min_overlap_minutes: None,
            team_capacity: (1, 2),
            ..MatchConfig::default()
        }
    }

    #[test]
    fn expansion_yields_one_child_per_feasible_team() {
        let pool = two_team_pool();
        let index = OverlapIndex::build(&pool);
        let config = config();
        let root = Branch::root(root_slots(&pool, &index, &config));

        // m1 overlaps both navigators: two children.
        let children = expand(&root, &pool, &index, &config);
        assert_eq!(children.len(), 2);

        // m2 overlaps neither: single unplaced child.
        let after = &children[0];
        let children = expand(after, &pool, &index, &config);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].unplaced.len(), 1);
    }

    #[test]
    fn budget_of_zero_returns_all_unplaced_and_flags() {
        let pool = two_team_pool();
        let index = OverlapIndex::build(&pool);
        let config = MatchConfig {
            branch_limit: Some(0),
            ..config()
        };

        let outcome = explore(&pool, &index, &config);
        assert!(outcome.budget_exceeded);
        assert_eq!(outcome.branches_explored, 0);
        assert_eq!(outcome.best.unplaced.len(), 2);
    }

    #[test]
    fn tight_budget_still_places_the_top_mentee() {
        let pool = two_team_pool();
        let index = OverlapIndex::build(&pool);
        let config = MatchConfig {
            branch_limit: Some(1),
            ..config()
        };

        let outcome = explore(&pool, &index, &config);
        assert!(outcome.budget_exceeded);
        let placed: usize = outcome.best.teams.iter().map(|t| t.mentees.len()).sum();
        assert_eq!(placed, 1);
    }

    #[test]
    fn exhaustive_run_is_not_flagged() {
        let pool = two_team_pool();
        let index = OverlapIndex::build(&pool);
        let outcome = explore(&pool, &index, &config());
        assert!(!outcome.budget_exceeded);
        assert!(outcome.branches_explored > 0);
    }
}
