//! Candidate pool: people, roles, and the deterministic orderings the search
//! relies on.
//!
//! Mentees are exposed in the documented total order (ascending rank, ties by
//! descending score, then ascending id) so two runs over the same input place
//! people identically. The pool is immutable once built; the search tracks who
//! is consumed in its own branch state.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::availability::{Availability, MINUTES_PER_DAY};

/// Role with its role-specific attributes. Only mentees carry a selection
/// rank (lower = higher priority).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Role {
    Mentee { rank: u32 },
    Navigator,
    Captain,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mentee { .. } => "mentee",
            Self::Navigator => "navigator",
            Self::Captain => "captain",
        }
    }
}

/// One fully resolved candidate record. Scores are finalized upstream and may
/// be negative; eligibility is decided upstream as well.
#[derive(Debug, Clone, Serialize)]
pub struct Person {
    pub id: String,
    #[serde(flatten)]
    pub role: Role,
    pub score: f64,
    pub eligible: bool,
    pub availability: Availability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputErrorKind {
    DuplicateId,
    InvalidSlot,
    OverlappingOwnSlots,
    NonFiniteScore,
}

impl InputErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateId => "duplicate-id",
            Self::InvalidSlot => "invalid-slot",
            Self::OverlappingOwnSlots => "overlapping-own-slots",
            Self::NonFiniteScore => "non-finite-score",
        }
    }
}

/// Malformed candidate data, detected before any search starts. Fatal to the
/// run and always names the offending person.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputError {
    pub person_id: String,
    pub kind: InputErrorKind,
    pub detail: String,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} for person '{}': {}",
            self.kind.as_str(),
            self.person_id,
            self.detail
        )
    }
}

impl std::error::Error for InputError {}

/// Immutable snapshot of everyone in a matching run.
#[derive(Debug, Clone)]
pub struct CandidatePool {
    people: Vec<Person>,
    mentees: Vec<usize>,
    navigators: Vec<usize>,
    captains: Vec<usize>,
}

impl CandidatePool {
    /// Validate and index a list of people. Ineligible people are kept in the
    /// snapshot but excluded from the matching views; malformed records are
    /// an [InputError].
    pub fn build(people: Vec<Person>) -> Result<Self, InputError> {
        let mut seen = HashSet::new();
        for person in &people {
            if !seen.insert(person.id.as_str()) {
                return Err(InputError {
                    person_id: person.id.clone(),
                    kind: InputErrorKind::DuplicateId,
                    detail: "another person already uses this id".to_string(),
                });
            }
            if !person.score.is_finite() {
                return Err(InputError {
                    person_id: person.id.clone(),
                    kind: InputErrorKind::NonFiniteScore,
                    detail: format!("score {} is not a finite number", person.score),
                });
            }
            for slot in person.availability.slots() {
                if slot.end < slot.start || slot.end > MINUTES_PER_DAY {
                    return Err(InputError {
                        person_id: person.id.clone(),
                        kind: InputErrorKind::InvalidSlot,
                        detail: format!(
                            "{} [{}, {}) is not a valid minute range",
                            slot.day, slot.start, slot.end
                        ),
                    });
                }
            }
            if let Some((a, b)) = person.availability.overlapping_own_slots() {
                return Err(InputError {
                    person_id: person.id.clone(),
                    kind: InputErrorKind::OverlappingOwnSlots,
                    detail: format!(
                        "{} [{}, {}) overlaps [{}, {})",
                        a.day, a.start, a.end, b.start, b.end
                    ),
                });
            }
        }

        let mut mentees = Vec::new();
        let mut navigators = Vec::new();
        let mut captains = Vec::new();
        for (index, person) in people.iter().enumerate() {
            if !person.eligible {
                continue;
            }
            match person.role {
                Role::Mentee { .. } => mentees.push(index),
                Role::Navigator => navigators.push(index),
                Role::Captain => captains.push(index),
            }
        }

        // Rank ascending, then score descending, then id: the total order
        // that makes placement reproducible across runs.
        mentees.sort_by(|&a, &b| {
            let (pa, pb) = (&people[a], &people[b]);
            rank_of(pa)
                .cmp(&rank_of(pb))
                .then_with(|| pb.score.total_cmp(&pa.score))
                .then_with(|| pa.id.cmp(&pb.id))
        });
        navigators.sort_by(|&a, &b| people[a].id.cmp(&people[b].id));
        captains.sort_by(|&a, &b| people[a].id.cmp(&people[b].id));

        Ok(Self {
            people,
            mentees,
            navigators,
            captains,
        })
    }

    pub fn person(&self, index: usize) -> &Person {
        &self.people[index]
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// Eligible mentees in placement order.
    pub fn mentees(&self) -> &[usize] {
        &self.mentees
    }

    /// Eligible navigators, ordered by id.
    pub fn navigators(&self) -> &[usize] {
        &self.navigators
    }

    /// Eligible captains, ordered by id.
    pub fn captains(&self) -> &[usize] {
        &self.captains
    }

    pub fn find(&self, id: &str) -> Option<usize> {
        self.people.iter().position(|person| person.id == id)
    }

    /// Position of a mentee in placement order; lower = higher priority.
    pub fn mentee_priority(&self, index: usize) -> Option<usize> {
        self.mentees.iter().position(|&m| m == index)
    }
}

fn rank_of(person: &Person) -> u32 {
    match person.role {
        Role::Mentee { rank } => rank,
        _ => u32::MAX,
    }
}
