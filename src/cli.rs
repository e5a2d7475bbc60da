//! Command dispatch for the `teamforge` binary.
//!
//! The engine itself is a library; this layer is the thin administrative
//! tooling around it: load a people export, run the matching, inspect
//! overlaps, or write the roster out for spreadsheet review.

use crate::availability::Availability;
use crate::data::config_file::load_config;
use crate::data::export_csv::write_roster_csv;
use crate::data::people::load_people;
use crate::data::validate::validate_people;
use crate::parallel::WorkerPool;
use crate::pool::{CandidatePool, Role};
use crate::search::{run_matching, run_matching_with_pool, MatchConfig, MatchOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Match,
    Validate,
    Overlap,
    Export,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("match") => Some(Command::Match),
        Some("validate") => Some(Command::Validate),
        Some("overlap") => Some(Command::Overlap),
        Some("export") => Some(Command::Export),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Match) => handle_match(args),
        Some(Command::Validate) => handle_validate(args),
        Some(Command::Overlap) => handle_overlap(args),
        Some(Command::Export) => handle_export(args),
        None => {
            eprintln!("usage: teamforge <match|validate|overlap|export>");
            2
        }
    }
}

fn load_settings(config_path: Option<&String>) -> Result<(MatchConfig, WorkerPool), String> {
    match config_path {
        Some(path) => load_config(path),
        None => Ok((MatchConfig::default(), WorkerPool::default())),
    }
}

fn run_engine(people_path: &str, config_path: Option<&String>) -> Result<MatchOutcome, String> {
    let people = load_people(people_path)?;
    let (config, workers) = load_settings(config_path)?;
    let outcome = if workers.workers > 0 {
        run_matching_with_pool(people, &config, &workers)
    } else {
        run_matching(people, &config)
    };
    outcome.map_err(|err| err.to_string())
}

fn handle_match(args: &[String]) -> i32 {
    let Some(people_path) = args.get(2) else {
        eprintln!("usage: teamforge match <people.json> [config.yaml]");
        return 2;
    };

    match run_engine(people_path, args.get(3)) {
        Ok(outcome) => match serde_json::to_string_pretty(&outcome) {
            Ok(payload) => {
                println!("{payload}");
                0
            }
            Err(err) => {
                eprintln!("failed to serialize match outcome: {err}");
                1
            }
        },
        Err(err) => {
            eprintln!("match failed: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let Some(people_path) = args.get(2) else {
        eprintln!("usage: teamforge validate <people.json>");
        return 2;
    };

    let people = match load_people(people_path) {
        Ok(people) => people,
        Err(err) => {
            eprintln!("validate failed: {err}");
            return 1;
        }
    };

    let report = validate_people(&people);
    if report.has_errors() {
        eprintln!("validation failed: {} issue(s)", report.diagnostics.len());
        for diag in &report.diagnostics {
            eprintln!("- {diag}");
        }
        return 1;
    }

    let eligible = |matches: fn(&Role) -> bool| {
        people
            .iter()
            .filter(|person| person.eligible && matches(&person.role))
            .count()
    };
    let summary = serde_json::json!({
        "people": people.len(),
        "mentees": eligible(|role| matches!(role, Role::Mentee { .. })),
        "navigators": eligible(|role| matches!(role, Role::Navigator)),
        "captains": eligible(|role| matches!(role, Role::Captain)),
        "diagnostics": report.diagnostics,
    });
    println!("{summary}");
    0
}

fn handle_overlap(args: &[String]) -> i32 {
    let (Some(people_path), true) = (args.get(2), args.len() >= 5) else {
        eprintln!("usage: teamforge overlap <people.json> <id> <id> [id...]");
        return 2;
    };

    let people = match load_people(people_path) {
        Ok(people) => people,
        Err(err) => {
            eprintln!("overlap failed: {err}");
            return 1;
        }
    };
    let pool = match CandidatePool::build(people) {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("overlap failed: {err}");
            return 1;
        }
    };

    let ids = &args[3..];
    let mut members = Vec::with_capacity(ids.len());
    for id in ids {
        match pool.find(id) {
            Some(index) => members.push(index),
            None => {
                eprintln!("overlap failed: no person with id '{id}'");
                return 1;
            }
        }
    }

    let shared = Availability::intersect_all(
        members.iter().map(|&index| &pool.person(index).availability),
    );
    let summary = serde_json::json!({
        "members": ids,
        "overlap_minutes": shared.total_minutes(),
        "windows": shared.slots(),
    });
    match serde_json::to_string_pretty(&summary) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize overlap summary: {err}");
            1
        }
    }
}

fn handle_export(args: &[String]) -> i32 {
    let (Some(people_path), Some(out_path)) = (args.get(2), args.get(3)) else {
        eprintln!("usage: teamforge export <people.json> <out.csv> [config.yaml]");
        return 2;
    };

    match run_engine(people_path, args.get(4)) {
        Ok(outcome) => {
            if let Err(err) = write_roster_csv(&outcome.roster, out_path) {
                eprintln!("export failed: {err}");
                return 1;
            }
            match serde_json::to_string_pretty(&outcome.report) {
                Ok(payload) => {
                    println!("{payload}");
                    0
                }
                Err(err) => {
                    eprintln!("failed to serialize run report: {err}");
                    1
                }
            }
        }
        Err(err) => {
            eprintln!("export failed: {err}");
            1
        }
    }
}
