use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_teamforge")
}

fn unique_temp_path(name: &str, ext: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("teamforge-{name}-{stamp}.{ext}"))
}

/// A cohort that clears the default thresholds: everyone shares Mon 09:00-18:00
/// (540 minutes, above the 300-minute team and 180-minute captain minimums).
fn cohort_json() -> &'static str {
    r#"{"people": [
        {"id": "nav", "role": "navigator",
         "availability": [{"day": "mon", "start": "09:00", "end": "18:00"}]},
        {"id": "cap", "role": "captain",
         "availability": [{"day": "mon", "start": "09:00", "end": "18:00"}]},
        {"id": "m1", "role": "mentee", "rank": 1, "score": 30.0,
         "availability": [{"day": "mon", "start": "09:00", "end": "18:00"}]},
        {"id": "m2", "role": "mentee", "rank": 2, "score": 20.0,
         "availability": [{"day": "mon", "start": "09:00", "end": "18:00"}]},
        {"id": "m3", "role": "mentee", "rank": 3, "score": 10.0,
         "availability": [{"day": "mon", "start": "09:00", "end": "18:00"}]}
    ]}"#
}

fn write_cohort(name: &str) -> PathBuf {
    let path = unique_temp_path(name, "json");
    fs::write(&path, cohort_json()).expect("fixture should be written");
    path
}

#[test]
fn bare_invocation_returns_usage() {
    let output = Command::new(bin()).output().expect("binary should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: teamforge <match|validate|overlap|export>"));
}

#[test]
fn match_command_returns_usage_without_path() {
    let output = Command::new(bin())
        .arg("match")
        .output()
        .expect("match should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: teamforge match"));
}

#[test]
fn match_command_emits_roster_and_report_json() {
    let path = write_cohort("match");

    let output = Command::new(bin())
        .args(["match", path.to_string_lossy().as_ref()])
        .output()
        .expect("match should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("match should emit json");
    assert_eq!(
        payload["roster"]["teams"][0]["mentees"]
            .as_array()
            .map(Vec::len),
        Some(3)
    );
    assert_eq!(payload["report"]["mentees_placed"], 3);
    assert_eq!(payload["report"]["budget_exceeded"], false);

    let _ = fs::remove_file(path);
}

#[test]
fn match_command_accepts_a_config_file() {
    let people = write_cohort("match-config");
    let config = unique_temp_path("config", "yaml");
    fs::write(
        &config,
        "min_overlap_minutes: 60\nteam_capacity_min: 1\nteam_capacity_max: 2\nworkers: 2\n",
    )
        .expect("fixture should be written");

    let output = Command::new(bin())
        .args([
            "match",
            people.to_string_lossy().as_ref(),
            config.to_string_lossy().as_ref(),
        ])
        .output()
        .expect("match should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("match should emit json");
    // Capacity max 2 leaves the third mentee out.
    assert_eq!(payload["report"]["mentees_placed"], 2);
    assert_eq!(payload["report"]["mentees_unplaced"], 1);

    let _ = fs::remove_file(people);
    let _ = fs::remove_file(config);
}

#[test]
fn validate_command_summarizes_the_pool() {
    let path = write_cohort("validate");

    let output = Command::new(bin())
        .args(["validate", path.to_string_lossy().as_ref()])
        .output()
        .expect("validate should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("validate should emit json");
    assert_eq!(payload["people"], 5);
    assert_eq!(payload["mentees"], 3);
    assert_eq!(payload["navigators"], 1);
    assert_eq!(payload["captains"], 1);
    assert_eq!(payload["diagnostics"].as_array().map(Vec::len), Some(0));

    let _ = fs::remove_file(path);
}

#[test]
fn validate_command_surfaces_warnings_without_failing() {
    let path = unique_temp_path("warn", "json");
    fs::write(
        &path,
        r#"[{"id": "nav", "role": "navigator",
             "availability": [{"day": "mon", "start": "09:00", "end": "18:00"}]},
            {"id": "m1", "role": "mentee", "rank": 1}]"#,
    )
    .expect("fixture should be written");

    let output = Command::new(bin())
        .args(["validate", path.to_string_lossy().as_ref()])
        .output()
        .expect("validate should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("validate should emit json");
    let diagnostics = payload["diagnostics"].as_array().expect("diagnostics array");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["severity"], "warning");
    assert!(diagnostics[0]["message"]
        .as_str()
        .unwrap()
        .contains("no availability slots"));

    let _ = fs::remove_file(path);
}

#[test]
fn validate_command_returns_non_zero_on_bad_data() {
    let path = unique_temp_path("invalid", "json");
    fs::write(
        &path,
        r#"[{"id": "dup", "role": "navigator"}, {"id": "dup", "role": "captain"}]"#,
    )
    .expect("fixture should be written");

    let output = Command::new(bin())
        .args(["validate", path.to_string_lossy().as_ref()])
        .output()
        .expect("validate should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("duplicate id 'dup'"));

    let _ = fs::remove_file(path);
}

#[test]
fn overlap_command_reports_shared_minutes() {
    let path = write_cohort("overlap");

    let output = Command::new(bin())
        .args(["overlap", path.to_string_lossy().as_ref(), "nav", "m1", "m2"])
        .output()
        .expect("overlap should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("overlap should emit json");
    assert_eq!(payload["overlap_minutes"], 540);

    let _ = fs::remove_file(path);
}

#[test]
fn overlap_command_rejects_unknown_ids() {
    let path = write_cohort("overlap-unknown");

    let output = Command::new(bin())
        .args(["overlap", path.to_string_lossy().as_ref(), "nav", "ghost"])
        .output()
        .expect("overlap should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ghost"));

    let _ = fs::remove_file(path);
}

#[test]
fn export_command_writes_the_roster_csv() {
    let people = write_cohort("export");
    let out = unique_temp_path("roster", "csv");

    let output = Command::new(bin())
        .args([
            "export",
            people.to_string_lossy().as_ref(),
            out.to_string_lossy().as_ref(),
        ])
        .output()
        .expect("export should run");

    assert_eq!(output.status.code(), Some(0));
    let rendered = fs::read_to_string(&out).expect("export should write the csv");
    let mut lines = rendered.lines();
    assert_eq!(
        lines.next(),
        Some("team,navigator,captain,mentee,overlap_minutes")
    );
    assert_eq!(lines.next(), Some("1,nav,cap,m1,540"));

    let _ = fs::remove_file(people);
    let _ = fs::remove_file(out);
}
