//! Write a roster to CSV for spreadsheet review.
//!
//! One row per placed mentee plus one row per unplaced mentee (empty team
//! columns). Columns: `team,navigator,captain,mentee,overlap_minutes`.
//! Team numbering follows roster order, which is navigator priority order.

use std::fs::File;

use csv::Writer;

use crate::search::Roster;

const HEADER: [&str; 5] = ["team", "navigator", "captain", "mentee", "overlap_minutes"];

pub fn write_roster_csv(roster: &Roster, path: &str) -> Result<(), String> {
    let file = File::create(path).map_err(|err| format!("unable to create '{path}': {err}"))?;
    let mut writer = Writer::from_writer(file);
    write_rows(roster, &mut writer).map_err(|err| format!("unable to write '{path}': {err}"))
}

/// Render the CSV into a string; used by tests and for stdout export.
pub fn roster_to_csv_string(roster: &Roster) -> Result<String, String> {
    let mut writer = Writer::from_writer(Vec::new());
    write_rows(roster, &mut writer).map_err(|err| err.to_string())?;
    let bytes = writer
        .into_inner()
        .map_err(|err| format!("csv flush failed: {err}"))?;
    String::from_utf8(bytes).map_err(|err| format!("csv output is not utf-8: {err}"))
}

fn write_rows<W: std::io::Write>(roster: &Roster, writer: &mut Writer<W>) -> Result<(), csv::Error> {
    writer.write_record(HEADER)?;
    for (number, team) in roster.teams.iter().enumerate() {
        let team_label = (number + 1).to_string();
        let captain = team.captain.as_deref().unwrap_or("");
        let overlap = team.overlap_minutes.to_string();
        for mentee in &team.mentees {
            writer.write_record([
                team_label.as_str(),
                team.navigator.as_str(),
                captain,
                mentee.as_str(),
                overlap.as_str(),
            ])?;
        }
    }
    for mentee in &roster.unplaced {
        writer.write_record(["", "", "", mentee.as_str(), ""])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::roster_to_csv_string;
    use crate::search::{Roster, TeamAssignment};

    #[test]
    fn roster_rows_cover_placed_and_unplaced() {
        let roster = Roster {
            teams: vec![TeamAssignment {
                navigator: "nav-a".to_string(),
                captain: Some("cap-a".to_string()),
                mentees: vec!["m1".to_string(), "m2".to_string()],
                staffed: true,
                overlap_minutes: 300,
            }],
            unplaced: vec!["m3".to_string()],
        };

        let rendered = roster_to_csv_string(&roster).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines,
            vec![
                "team,navigator,captain,mentee,overlap_minutes",
                "1,nav-a,cap-a,m1,300",
                "1,nav-a,cap-a,m2,300",
                ",,,m3,",
            ]
        );
    }

    #[test]
    fn empty_roster_renders_header_only() {
        let roster = Roster {
            teams: vec![],
            unplaced: vec![],
        };
        let rendered = roster_to_csv_string(&roster).unwrap();
        assert_eq!(rendered.trim(), "team,navigator,captain,mentee,overlap_minutes");
    }
}
