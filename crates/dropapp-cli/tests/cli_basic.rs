//! Basic CLI E2E tests.
//!
//! Each test invokes the CLI via `cargo run` against its own throwaway
//! data directory and checks the JSON it prints. The interactive watch
//! mode is not exercised here.

use std::path::Path;
use std::process::Command;

/// Run a CLI command against the given data dir and return
/// (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "dropapp-cli", "--quiet", "--"])
        .args(args)
        .env("DROPAPP_DATA_DIR", data_dir)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn status_reports_idle_before_any_start() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(dir.path(), &["timer", "status"]);
    assert_eq!(code, 0, "timer status failed: {stderr}");
    let snapshot: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(snapshot["type"], "StateSnapshot");
    assert_eq!(snapshot["phase"], "idle");
    assert_eq!(snapshot["interval_ms"], 3_600_000);
}

#[test]
fn start_then_status_counts_down() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(dir.path(), &["timer", "start"]);
    assert_eq!(code, 0, "timer start failed: {stderr}");
    let event: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(event["type"], "CycleStarted");
    assert_eq!(event["interval_ms"], 3_600_000);

    let (stdout, _, code) = run_cli(dir.path(), &["timer", "status"]);
    assert_eq!(code, 0);
    let snapshot: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(snapshot["phase"], "counting");
    assert!(snapshot["remaining_ms"].as_u64().unwrap() <= 3_600_000);
}

#[test]
fn drink_logs_and_shows_in_stats() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["timer", "start"]);
    assert_eq!(code, 0);
    let (stdout, stderr, code) = run_cli(dir.path(), &["timer", "drink"]);
    assert_eq!(code, 0, "timer drink failed: {stderr}");
    let event: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(event["type"], "DrinkLogged");
    // Acknowledged before any alert: no response time.
    assert!(event["response_ms"].is_null());

    let (stdout, stderr, code) = run_cli(dir.path(), &["stats", "today"]);
    assert_eq!(code, 0, "stats today failed: {stderr}");
    let stats: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(stats["today_drinks"], 1);
}

#[test]
fn config_set_get_list_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "timer.interval_hours", "2"]);
    assert_eq!(code, 0, "config set failed: {stderr}");

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "timer.interval_hours"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "2.0");

    let (stdout, _, code) = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(code, 0);
    let listed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(listed["timer"]["interval_hours"], 2.0);

    let (stdout, _, code) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("reset"));
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "timer.interval_hours"]);
    assert_eq!(stdout.trim(), "1.0");
}

#[test]
fn config_get_unknown_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "timer.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn out_of_range_interval_does_not_move_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["timer", "start"]);
    assert_eq!(code, 0);

    // The raw value stores fine; the engine keeps its last valid interval.
    let (_, _, code) = run_cli(dir.path(), &["config", "set", "timer.interval_hours", "30"]);
    assert_eq!(code, 0);

    let (stdout, _, code) = run_cli(dir.path(), &["timer", "status"]);
    assert_eq!(code, 0);
    let snapshot: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(snapshot["interval_ms"], 3_600_000);
}

#[test]
fn stats_all_empty_is_well_formed() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(dir.path(), &["stats", "all"]);
    assert_eq!(code, 0, "stats all failed: {stderr}");
    let stats: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(stats["total_drinks"], 0);
    assert!(stats["avg_response_ms"].is_null());
    assert!(stats["last_drink_at"].is_null());
}

#[test]
fn stats_recent_lists_drinks() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["timer", "start"]);
    run_cli(dir.path(), &["timer", "drink"]);
    run_cli(dir.path(), &["timer", "drink"]);

    let (stdout, stderr, code) = run_cli(dir.path(), &["stats", "recent", "--limit", "1"]);
    assert_eq!(code, 0, "stats recent failed: {stderr}");
    let drinks: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(drinks.as_array().unwrap().len(), 1);
}
