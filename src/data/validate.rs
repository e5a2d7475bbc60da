//! Input diagnostics for a loaded people dataset.
//!
//! Runs before matching and reports everything at once instead of stopping at
//! the first bad record. Errors mirror the conditions the pool builder
//! rejects; warnings and infos flag people who cannot be placed.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::availability::MINUTES_PER_DAY;
use crate::pool::{Person, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DatasetReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl DatasetReport {
    pub fn push(
        &mut self,
        severity: Severity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(Diagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == Severity::Error)
    }
}

/// Diagnose a people dataset. The dataset is safe to hand to the engine
/// exactly when no errors are present.
pub fn validate_people(people: &[Person]) -> DatasetReport {
    let mut report = DatasetReport::default();
    let mut seen_ids = HashSet::new();

    for (index, person) in people.iter().enumerate() {
        let context = format!("person[{index}] id='{}'", person.id);

        if !seen_ids.insert(person.id.as_str()) {
            report.push(
                Severity::Error,
                context.clone(),
                format!("duplicate id '{}'", person.id),
            );
        }
        if !person.score.is_finite() {
            report.push(
                Severity::Error,
                context.clone(),
                format!("score {} is not a finite number", person.score),
            );
        }
        for slot in person.availability.slots() {
            if slot.end < slot.start || slot.end > MINUTES_PER_DAY {
                report.push(
                    Severity::Error,
                    context.clone(),
                    format!(
                        "slot {} [{}, {}) is not a valid minute range",
                        slot.day, slot.start, slot.end
                    ),
                );
            }
        }
        if let Some((a, b)) = person.availability.overlapping_own_slots() {
            report.push(
                Severity::Error,
                context.clone(),
                format!(
                    "own slots overlap: {} [{}, {}) and [{}, {})",
                    a.day, a.start, a.end, b.start, b.end
                ),
            );
        }

        if !person.eligible {
            report.push(
                Severity::Info,
                context,
                "marked ineligible; excluded from matching",
            );
        } else if person.availability.is_empty() {
            report.push(
                Severity::Warning,
                context,
                "no availability slots; cannot join any team",
            );
        }
    }

    let eligible = |role_matches: fn(&Role) -> bool| {
        people
            .iter()
            .any(|person| person.eligible && role_matches(&person.role))
    };
    if !eligible(|role| matches!(role, Role::Navigator)) {
        report.push(
            Severity::Warning,
            "dataset",
            "no eligible navigators; every roster will be empty",
        );
    }
    if !eligible(|role| matches!(role, Role::Mentee { .. })) {
        report.push(
            Severity::Warning,
            "dataset",
            "no eligible mentees; there is nobody to place",
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::{validate_people, Severity};
    use crate::availability::{Availability, TimeSlot, Weekday};
    use crate::pool::{Person, Role};

    fn person(id: &str, role: Role, slots: Vec<TimeSlot>) -> Person {
        Person {
            id: id.to_string(),
            role,
            score: 1.0,
            eligible: true,
            availability: Availability::new(slots),
        }
    }

    fn morning(day: Weekday) -> TimeSlot {
        TimeSlot::new(day, 540, 720)
    }

    #[test]
    fn clean_dataset_yields_no_diagnostics() {
        let report = validate_people(&[
            person("nav", Role::Navigator, vec![morning(Weekday::Mon)]),
            person("m1", Role::Mentee { rank: 1 }, vec![morning(Weekday::Mon)]),
        ]);
        assert!(report.diagnostics.is_empty(), "got: {:?}", report.diagnostics);
        assert!(!report.has_errors());
    }

    #[test]
    fn duplicate_id_is_an_error() {
        let report = validate_people(&[
            person("dup", Role::Navigator, vec![morning(Weekday::Mon)]),
            person("dup", Role::Mentee { rank: 1 }, vec![morning(Weekday::Mon)]),
        ]);
        assert!(report.has_errors());
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error && d.message.contains("duplicate id 'dup'")));
    }

    #[test]
    fn empty_availability_is_a_warning_not_an_error() {
        let report = validate_people(&[
            person("nav", Role::Navigator, vec![morning(Weekday::Mon)]),
            person("m1", Role::Mentee { rank: 1 }, vec![]),
        ]);
        assert!(!report.has_errors());
        assert!(report.diagnostics.iter().any(|d| {
            d.severity == Severity::Warning && d.context.contains("id='m1'")
        }));
    }

    #[test]
    fn ineligible_person_is_an_info() {
        let mut sidelined = person("out", Role::Mentee { rank: 1 }, vec![morning(Weekday::Mon)]);
        sidelined.eligible = false;
        let report = validate_people(&[
            person("nav", Role::Navigator, vec![morning(Weekday::Mon)]),
            person("m1", Role::Mentee { rank: 2 }, vec![morning(Weekday::Mon)]),
            sidelined,
        ]);
        assert!(!report.has_errors());
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Info && d.context.contains("id='out'")));
    }

    #[test]
    fn missing_roles_are_flagged_dataset_wide() {
        let report = validate_people(&[person(
            "m1",
            Role::Mentee { rank: 1 },
            vec![morning(Weekday::Mon)],
        )]);
        assert!(report.diagnostics.iter().any(|d| {
            d.severity == Severity::Warning && d.message.contains("no eligible navigators")
        }));
    }

    #[test]
    fn broken_slots_and_scores_are_errors() {
        let mut nan = person("nan", Role::Mentee { rank: 1 }, vec![morning(Weekday::Mon)]);
        nan.score = f64::NAN;
        let late = person(
            "late",
            Role::Navigator,
            vec![TimeSlot::new(Weekday::Fri, 600, 1500)],
        );
        let report = validate_people(&[nan, late]);
        let errors = report
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        assert_eq!(errors, 2);
        assert!(report.has_errors());
    }
}
