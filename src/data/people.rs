//! Load person records from JSON admin exports.
//!
//! Accepted shapes: a top-level array, or `{ "people": [...] }`. Each record:
//!
//! ```json
//! {
//!   "id": "m1",
//!   "role": "mentee",
//!   "rank": 1,
//!   "score": 27.5,
//!   "eligible": true,
//!   "availability": [
//!     { "day": "mon", "start": "09:00", "end": "12:00" }
//!   ]
//! }
//! ```
//!
//! `rank` is required for mentees and rejected for other roles; `score`
//! defaults to 0 and `eligible` to true. Times are `HH:MM` (24h, `24:00`
//! allowed as an end bound); day names accept any case and full names.

use std::fs;

use serde::Deserialize;

use crate::availability::{Availability, TimeSlot, Weekday};
use crate::pool::{Person, Role};

#[derive(Debug, Clone, Deserialize)]
pub struct SlotRecord {
    pub day: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonRecord {
    pub id: String,
    pub role: String,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default = "default_eligible")]
    pub eligible: bool,
    #[serde(default)]
    pub availability: Vec<SlotRecord>,
}

fn default_eligible() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PeoplePayload {
    Bare(Vec<PersonRecord>),
    Wrapped { people: Vec<PersonRecord> },
}

/// Load and convert a people file. Errors carry the file path or record id.
pub fn load_people(path: &str) -> Result<Vec<Person>, String> {
    let raw = fs::read_to_string(path).map_err(|err| format!("unable to read '{path}': {err}"))?;
    people_from_json(&raw)
}

pub fn people_from_json(raw: &str) -> Result<Vec<Person>, String> {
    let payload: PeoplePayload = serde_json::from_str(raw)
        .map_err(|err| format!("unable to parse people json: {err}"))?;
    let records = match payload {
        PeoplePayload::Bare(records) => records,
        PeoplePayload::Wrapped { people } => people,
    };
    records.into_iter().map(convert_record).collect()
}

fn convert_record(record: PersonRecord) -> Result<Person, String> {
    let id = record.id.trim().to_string();
    if id.is_empty() {
        return Err("record with empty 'id'".to_string());
    }

    let role = match record.role.trim().to_ascii_lowercase().as_str() {
        "mentee" | "djangonaut" => {
            let rank = record
                .rank
                .ok_or_else(|| format!("mentee '{id}' is missing 'rank'"))?;
            Role::Mentee { rank }
        }
        "navigator" => Role::Navigator,
        "captain" => Role::Captain,
        other => return Err(format!("person '{id}' has unknown role '{other}'")),
    };
    if record.rank.is_some() && !matches!(role, Role::Mentee { .. }) {
        return Err(format!("{} '{id}' must not carry a 'rank'", role.name()));
    }

    let mut slots = Vec::with_capacity(record.availability.len());
    for slot in &record.availability {
        let day = Weekday::parse(&slot.day)
            .ok_or_else(|| format!("person '{id}' has unknown day '{}'", slot.day))?;
        let start = parse_clock(&slot.start)
            .ok_or_else(|| format!("person '{id}' has invalid time '{}'", slot.start))?;
        let end = parse_clock(&slot.end)
            .ok_or_else(|| format!("person '{id}' has invalid time '{}'", slot.end))?;
        slots.push(TimeSlot::new(day, start, end));
    }

    Ok(Person {
        id,
        role,
        score: record.score.unwrap_or(0.0),
        eligible: record.eligible,
        availability: Availability::new(slots),
    })
}

/// Parse `HH:MM` into minutes since midnight. `24:00` is allowed as an
/// exclusive end bound.
fn parse_clock(raw: &str) -> Option<u16> {
    let (hours, minutes) = raw.trim().split_once(':')?;
    let hours: u16 = hours.parse().ok()?;
    let minutes: u16 = minutes.parse().ok()?;
    // Bound hours before multiplying so oversized values cannot overflow u16.
    if hours > 24 || minutes >= 60 {
        return None;
    }
    let total = hours * 60 + minutes;
    (total <= 24 * 60).then_some(total)
}
