//! Basic CLI E2E tests.
//!
//! Tests run the built binary against a throwaway data directory and
//! verify its JSON output.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_blockday"))
        .env("BLOCKDAY_DATA_DIR", data_dir)
        .env_remove("BLOCKDAY_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (output.status.code().unwrap_or(-1), stdout, stderr)
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (code, stdout, stderr) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("{args:?} printed invalid JSON ({e}): {stdout}"))
}

#[test]
fn test_template_list() {
    let dir = tempfile::tempdir().unwrap();
    let templates = run_json(dir.path(), &["template", "list"]);
    let ids: Vec<&str> = templates.as_array().unwrap().iter().map(|t| t["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["standard", "pomodoro", "deep-work", "half-day"]);
}

#[test]
fn test_template_show_unknown_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["template", "show", "nope"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"), "stderr: {stderr}");
}

#[test]
fn test_day_show_builds_standard_day() {
    let dir = tempfile::tempdir().unwrap();
    let day = run_json(dir.path(), &["--at", "2026-10-19T07:30", "day", "show"]);
    assert_eq!(day["date"], "2026-10-19");
    assert_eq!(day["blocks"].as_array().unwrap().len(), 7);
    assert_eq!(day["blocks"][0]["start"], "08:00");
    assert_eq!(day["stats"]["estimated_end"], "17:00");
    assert!(day["active_block"].is_null());
}

#[test]
fn test_day_complete_reflows_and_awards_xp() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_json(dir.path(), &["--at", "2026-10-19T09:30", "day", "complete", "1"]);
    assert_eq!(out["applied"], true);
    assert_eq!(out["day"]["blocks"][0]["status"], "COMPLETED");
    assert_eq!(out["day"]["blocks"][0]["end"], "09:30");
    assert_eq!(out["day"]["blocks"][1]["start"], "09:30");

    // second completion is a no-op
    let again = run_json(dir.path(), &["--at", "2026-10-19T09:40", "day", "complete", "1"]);
    assert_eq!(again["applied"], false);
    assert_eq!(again["already"], "COMPLETED");

    let progress = run_json(dir.path(), &["--at", "2026-10-19T09:45", "progress", "show"]);
    assert_eq!(progress["state"]["total_xp"], 60);
    assert_eq!(progress["state"]["current_streak"], 1);
}

#[test]
fn test_unknown_block_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["--at", "2026-10-19T09:00", "day", "skip", "42"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"), "stderr: {stderr}");
}

#[test]
fn test_carry_over_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["--at", "2026-10-18T10:00", "day", "complete", "1"]);

    let state = run_json(dir.path(), &["--at", "2026-10-19T07:50", "carry-over", "check"]);
    assert_eq!(state["state"], "offered");
    assert_eq!(state["offer"]["date"], "2026-10-18");
    assert_eq!(state["offer"]["total_incomplete_minutes"], 360);

    let accepted = run_json(dir.path(), &["--at", "2026-10-19T07:51", "carry-over", "accept", "3"]);
    assert_eq!(accepted["resolution"]["kind"], "accepted");
    assert_eq!(accepted["carried_minutes"], 120);

    let day = run_json(dir.path(), &["--at", "2026-10-19T07:52", "day", "show"]);
    assert_eq!(day["carried_minutes"], 120);
    assert_eq!(day["blocks"][0]["carried"], true);

    // consumed once
    let state = run_json(dir.path(), &["--at", "2026-10-19T12:00", "carry-over", "check"]);
    assert_eq!(state["state"], "resolved");
    let (code, _, _) = run_cli(dir.path(), &["--at", "2026-10-19T12:01", "carry-over", "dismiss"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_set_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "set", "schedule.template", "half-day"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (_, value, _) = run_cli(dir.path(), &["config", "get", "schedule.template"]);
    assert_eq!(value.trim(), "half-day");

    let day = run_json(dir.path(), &["--at", "2026-10-19T07:30", "day", "show"]);
    assert_eq!(day["template_id"], "half-day");

    let (code, _, _) = run_cli(dir.path(), &["config", "get", "schedule.nope"]);
    assert_eq!(code, 1);
}

#[test]
fn test_invalid_at_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["--at", "noon", "day", "show"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("invalid --at"));
}

#[test]
fn test_resize_beyond_a_day_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["--at", "2026-10-19T08:00", "day", "resize", "1", "4294967295"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"), "stderr: {stderr}");

    let day = run_json(dir.path(), &["--at", "2026-10-19T08:01", "day", "show"]);
    assert_eq!(day["blocks"][0]["duration_minutes"], 120);
}
