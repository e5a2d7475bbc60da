//! Weekly availability model: day-of-week time slots and overlap computation.
//!
//! Slots are half-open intervals `[start, end)` in minutes since midnight on a
//! 7-day cycle starting Sunday. Overlap between two people is the total number
//! of weekly minutes their slots coincide. Group overlap is the interval
//! intersection across every member's slots (windows where everyone is free at
//! the same time), computed by folding pairwise intersections, never by
//! summing pairwise overlaps, which would overcount.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minutes in one day; slot bounds must stay within `0..=MINUTES_PER_DAY`.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Day of week. The week starts on Sunday.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sun,
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sun => "sun",
            Self::Mon => "mon",
            Self::Tue => "tue",
            Self::Wed => "wed",
            Self::Thu => "thu",
            Self::Fri => "fri",
            Self::Sat => "sat",
        }
    }

    /// Parse a day name; accepts any case and full names ("Monday").
    pub fn parse(raw: &str) -> Option<Weekday> {
        let lower = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|day| lower.starts_with(day.as_str()))
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A half-open weekly time slot `[start, end)` in minutes since midnight.
///
/// `start == end` is a zero-length slot; it is legal input and contributes
/// zero to every overlap.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TimeSlot {
    pub day: Weekday,
    /// Start minute since midnight (inclusive).
    pub start: u16,
    /// End minute since midnight (exclusive).
    pub end: u16,
}

impl TimeSlot {
    pub fn new(day: Weekday, start: u16, end: u16) -> Self {
        Self { day, start, end }
    }

    pub fn duration_minutes(&self) -> u32 {
        u32::from(self.end.saturating_sub(self.start))
    }

    /// Overlapping minutes with another slot: `max(0, min(ends) - max(starts))`
    /// when the days match, zero otherwise.
    pub fn overlap_minutes(&self, other: &TimeSlot) -> u32 {
        if self.day != other.day {
            return 0;
        }
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        u32::from(end.saturating_sub(start))
    }

    /// Intersection with another slot, or `None` when the result would be
    /// empty (different day, no overlap, or zero length).
    pub fn intersect(&self, other: &TimeSlot) -> Option<TimeSlot> {
        if self.day != other.day {
            return None;
        }
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            Some(TimeSlot::new(self.day, start, end))
        } else {
            None
        }
    }
}

/// A person's weekly free time: an ordered list of slots.
///
/// Construction sorts by `(day, start)`. Slots belonging to one person must
/// not overlap each other; that invariant is enforced when a candidate pool
/// is built, not here, so partial data can still be inspected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    slots: Vec<TimeSlot>,
}

impl Availability {
    pub fn new(mut slots: Vec<TimeSlot>) -> Self {
        slots.sort();
        Self { slots }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn total_minutes(&self) -> u32 {
        self.slots.iter().map(TimeSlot::duration_minutes).sum()
    }

    /// Total weekly minutes where both people are free.
    ///
    /// O(S_a * S_b) over slot pairs; slot counts are small (bounded by the
    /// week), so the quadratic pass is fine and keeps the code obvious.
    pub fn pairwise_overlap_minutes(&self, other: &Availability) -> u32 {
        self.slots
            .iter()
            .map(|a| other.slots.iter().map(|b| a.overlap_minutes(b)).sum::<u32>())
            .sum()
    }

    /// Interval intersection with another availability.
    pub fn intersect(&self, other: &Availability) -> Availability {
        let mut out = Vec::new();
        for a in &self.slots {
            for b in &other.slots {
                if let Some(slot) = a.intersect(b) {
                    out.push(slot);
                }
            }
        }
        Availability::new(out)
    }

    /// Intersection across a whole group: windows where every member is free.
    ///
    /// An empty group or any member with no slots yields an empty result,
    /// a valid "cannot meet" outcome, not an error.
    pub fn intersect_all<'a, I>(members: I) -> Availability
    where
        I: IntoIterator<Item = &'a Availability>,
    {
        let mut iter = members.into_iter();
        let Some(first) = iter.next() else {
            return Availability::empty();
        };
        let mut current = first.clone();
        for member in iter {
            if current.is_empty() {
                break;
            }
            current = current.intersect(member);
        }
        current
    }

    /// First pair of this person's own slots that overlap each other, if any.
    /// Used by input validation; zero-length touching slots do not count.
    pub fn overlapping_own_slots(&self) -> Option<(TimeSlot, TimeSlot)> {
        self.slots.windows(2).find_map(|pair| {
            if pair[0].day == pair[1].day && pair[0].end > pair[1].start {
                Some((pair[0], pair[1]))
            } else {
                None
            }
        })
    }
}
