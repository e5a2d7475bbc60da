//! Pairwise overlap index, built once per matching run.
//!
//! Caches the weekly overlap minutes for every (navigator, mentee) and
//! (captain, mentee) pair, plus (captain, navigator) pairs used when captains
//! are attached to team slots. The index has no mutation API: if candidate
//! data changes, build a new one. Whole-team overlap is not cached (team
//! compositions vary during the search), but the pairwise cache bounds it
//! from above (an intersection can never exceed any pairwise overlap), which
//! lets the search skip most interval work.

use std::collections::HashMap;

use crate::availability::Availability;
use crate::pool::CandidatePool;

#[derive(Debug, Clone)]
pub struct OverlapIndex {
    navigator_mentee: HashMap<(usize, usize), u32>,
    captain_mentee: HashMap<(usize, usize), u32>,
    captain_navigator: HashMap<(usize, usize), u32>,
}

impl OverlapIndex {
    /// Precompute every pair for a fixed pool snapshot. O(N*M) pair
    /// evaluations, each O(S_a * S_b) over slot counts.
    pub fn build(pool: &CandidatePool) -> Self {
        let mut navigator_mentee = HashMap::new();
        let mut captain_mentee = HashMap::new();
        let mut captain_navigator = HashMap::new();

        for &nav in pool.navigators() {
            for &mentee in pool.mentees() {
                navigator_mentee.insert((nav, mentee), pairwise(pool, nav, mentee));
            }
        }
        for &captain in pool.captains() {
            for &mentee in pool.mentees() {
                captain_mentee.insert((captain, mentee), pairwise(pool, captain, mentee));
            }
            for &nav in pool.navigators() {
                captain_navigator.insert((captain, nav), pairwise(pool, captain, nav));
            }
        }

        Self {
            navigator_mentee,
            captain_mentee,
            captain_navigator,
        }
    }

    pub fn navigator_mentee(&self, navigator: usize, mentee: usize) -> u32 {
        self.navigator_mentee
            .get(&(navigator, mentee))
            .copied()
            .unwrap_or(0)
    }

    pub fn captain_mentee(&self, captain: usize, mentee: usize) -> u32 {
        self.captain_mentee
            .get(&(captain, mentee))
            .copied()
            .unwrap_or(0)
    }

    pub fn captain_navigator(&self, captain: usize, navigator: usize) -> u32 {
        self.captain_navigator
            .get(&(captain, navigator))
            .copied()
            .unwrap_or(0)
    }

    /// How many mentees clear the pairwise threshold with this navigator.
    /// Drives the navigator priority order at the search root.
    pub fn eligible_mentee_count(
        &self,
        pool: &CandidatePool,
        navigator: usize,
        threshold: u32,
    ) -> usize {
        pool.mentees()
            .iter()
            .filter(|&&mentee| self.navigator_mentee(navigator, mentee) >= threshold)
            .count()
    }

    /// Whole-team overlap: minutes where the navigator and every listed
    /// mentee are simultaneously free. Interval intersection across the full
    /// member set, per the cumulative meeting constraint.
    pub fn team_overlap_minutes(
        &self,
        pool: &CandidatePool,
        navigator: usize,
        mentees: &[usize],
    ) -> u32 {
        let members = std::iter::once(navigator)
            .chain(mentees.iter().copied())
            .map(|index| &pool.person(index).availability);
        Availability::intersect_all(members).total_minutes()
    }
}

fn pairwise(pool: &CandidatePool, a: usize, b: usize) -> u32 {
    pool.person(a)
        .availability
        .pairwise_overlap_minutes(&pool.person(b).availability)
}

#[cfg(test)]
mod tests {
    use super::OverlapIndex;
    use crate::availability::{Availability, TimeSlot, Weekday};
    use crate::pool::{CandidatePool, Person, Role};

    fn person(id: &str, role: Role, slots: Vec<TimeSlot>) -> Person {
        Person {
            id: id.to_string(),
            role,
            score: 0.0,
            eligible: true,
            availability: Availability::new(slots),
        }
    }

    fn sample_pool() -> CandidatePool {
        CandidatePool::build(vec![
            person(
                "nav-a",
                Role::Navigator,
                vec![TimeSlot::new(Weekday::Mon, 540, 720)],
            ),
            person(
                "cap-a",
                Role::Captain,
                vec![TimeSlot::new(Weekday::Mon, 600, 660)],
            ),
            person(
                "m1",
                Role::Mentee { rank: 1 },
                vec![TimeSlot::new(Weekday::Mon, 540, 600)],
            ),
            person("m2", Role::Mentee { rank: 2 }, vec![]),
        ])
        .expect("pool should build")
    }

    #[test]
    fn pairwise_entries_cover_navigator_and_captain_pairs() {
        let pool = sample_pool();
        let index = OverlapIndex::build(&pool);
        let nav = pool.find("nav-a").unwrap();
        let cap = pool.find("cap-a").unwrap();
        let m1 = pool.find("m1").unwrap();
        let m2 = pool.find("m2").unwrap();

        assert_eq!(index.navigator_mentee(nav, m1), 60);
        assert_eq!(index.navigator_mentee(nav, m2), 0);
        assert_eq!(index.captain_mentee(cap, m1), 0);
        assert_eq!(index.captain_navigator(cap, nav), 60);
    }

    #[test]
    fn missing_pair_reads_as_zero() {
        let pool = sample_pool();
        let index = OverlapIndex::build(&pool);
        assert_eq!(index.navigator_mentee(999, 998), 0);
    }

    #[test]
    fn eligible_mentee_count_applies_threshold() {
        let pool = sample_pool();
        let index = OverlapIndex::build(&pool);
        let nav = pool.find("nav-a").unwrap();
        assert_eq!(index.eligible_mentee_count(&pool, nav, 30), 1);
        assert_eq!(index.eligible_mentee_count(&pool, nav, 61), 0);
    }

    #[test]
    fn team_overlap_is_bounded_by_pairwise_entries() {
        let pool = sample_pool();
        let index = OverlapIndex::build(&pool);
        let nav = pool.find("nav-a").unwrap();
        let m1 = pool.find("m1").unwrap();
        let m2 = pool.find("m2").unwrap();

        let team = index.team_overlap_minutes(&pool, nav, &[m1]);
        assert_eq!(team, 60);
        assert!(team <= index.navigator_mentee(nav, m1));
        assert_eq!(index.team_overlap_minutes(&pool, nav, &[m1, m2]), 0);
    }
}
