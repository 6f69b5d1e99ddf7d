//! Integration tests for the gymforge binary.
//!
//! These tests verify end-to-end behavior including:
//! - Enrollment, check-in/out and progress reporting
//! - Session recording and completion
//! - Assessments and achievements
//! - Data persistence across invocations

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("gymforge"))
}

/// Run one subcommand against a data dir, pinned to a date
fn run(data_dir: &TempDir, date: &str, args: &[&str]) -> assert_cmd::assert::Assert {
    cli()
        .args(args)
        .arg("--data-dir")
        .arg(data_dir.path())
        .arg("--date")
        .arg(date)
        .assert()
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Gym membership progression and session tracker",
        ));
}

#[test]
fn test_enroll_and_progress() {
    let dir = setup_test_dir();

    run(&dir, "2024-03-04", &["enroll", "ada", "--name", "Ada"])
        .success()
        .stdout(predicate::str::contains("Enrolled ada"));

    run(&dir, "2024-03-04", &["progress", "ada"])
        .success()
        .stdout(predicate::str::contains("Level 1"))
        .stdout(predicate::str::contains("Rank E"));
}

#[test]
fn test_duplicate_enrollment_fails() {
    let dir = setup_test_dir();
    run(&dir, "2024-03-04", &["enroll", "ada"]).success();
    run(&dir, "2024-03-04", &["enroll", "ada"])
        .failure()
        .stderr(predicate::str::contains("already enrolled"));
}

#[test]
fn test_check_in_is_idempotent_per_day() {
    let dir = setup_test_dir();
    run(&dir, "2024-03-04", &["enroll", "ada"]).success();

    run(&dir, "2024-03-04", &["check-in", "ada"])
        .success()
        .stdout(predicate::str::contains("streak 1"));

    run(&dir, "2024-03-04", &["check-in", "ada"])
        .success()
        .stdout(predicate::str::contains("Already checked in"));
}

#[test]
fn test_streak_grows_across_days() {
    let dir = setup_test_dir();
    run(&dir, "2024-03-04", &["enroll", "ada"]).success();

    run(&dir, "2024-03-04", &["check-in", "ada"]).success();
    run(&dir, "2024-03-05", &["check-in", "ada"])
        .success()
        .stdout(predicate::str::contains("streak 2"))
        .stdout(predicate::str::contains("x1.1"));

    // Check-ins build the multiplier but award nothing themselves
    run(&dir, "2024-03-05", &["progress", "ada"])
        .success()
        .stdout(predicate::str::contains("Total exp 0"));
}

#[test]
fn test_weekend_gap_is_forgiven_for_weekday_trainees() {
    let dir = setup_test_dir();
    run(&dir, "2024-03-01", &["enroll", "ada"]).success();
    run(
        &dir,
        "2024-03-01",
        &["training-days", "ada", "mon", "tue", "wed", "thu", "fri"],
    )
    .success();

    // Friday, then Monday over a rest-day weekend
    run(&dir, "2024-03-01", &["check-in", "ada"]).success();
    run(&dir, "2024-03-04", &["check-in", "ada"])
        .success()
        .stdout(predicate::str::contains("streak 2"));
}

#[test]
fn test_log_set_unlocks_first_workout() {
    let dir = setup_test_dir();
    run(&dir, "2024-03-04", &["enroll", "ada"]).success();

    run(&dir, "2024-03-04", &["log-set", "ada", "bench_press", "10"])
        .success()
        .stdout(predicate::str::contains("+15 exp"))
        .stdout(predicate::str::contains("Achievement unlocked: First Workout"));

    run(&dir, "2024-03-04", &["achievements", "ada"])
        .success()
        .stdout(predicate::str::contains("First Workout"));
}

#[test]
fn test_session_completion_flow() {
    let dir = setup_test_dir();
    run(&dir, "2024-03-04", &["enroll", "ada"]).success();
    run(&dir, "2024-03-04", &["session", "start", "ada", "recovery"])
        .success()
        .stdout(predicate::str::contains("Session started"));

    // recovery is 2 sets of yoga_flow plus 3 sets of plank
    run(&dir, "2024-03-04", &["session", "set", "ada", "recovery", "yoga_flow", "1", "1"]).success();
    run(&dir, "2024-03-04", &["session", "set", "ada", "recovery", "yoga_flow", "2", "1"]).success();
    run(&dir, "2024-03-04", &["session", "set", "ada", "recovery", "plank", "1", "1"]).success();
    run(&dir, "2024-03-04", &["session", "set", "ada", "recovery", "plank", "2", "1"]).success();

    run(&dir, "2024-03-04", &["session", "status", "ada", "recovery"])
        .success()
        .stdout(predicate::str::contains("4/5 sets"));

    run(&dir, "2024-03-04", &["session", "set", "ada", "recovery", "plank", "3", "1"])
        .success()
        .stdout(predicate::str::contains("Session complete"));

    // Starting again the same day reports the completed session
    run(&dir, "2024-03-04", &["session", "start", "ada", "recovery"])
        .success()
        .stdout(predicate::str::contains("already completed"));
}

#[test]
fn test_session_resume_lists_recorded_sets() {
    let dir = setup_test_dir();
    run(&dir, "2024-03-04", &["enroll", "ada"]).success();
    run(&dir, "2024-03-04", &["session", "start", "ada", "recovery"]).success();
    run(&dir, "2024-03-04", &["session", "set", "ada", "recovery", "yoga_flow", "1", "1"]).success();
    run(&dir, "2024-03-04", &["session", "set", "ada", "recovery", "plank", "1", "1"]).success();

    run(&dir, "2024-03-04", &["session", "start", "ada", "recovery"])
        .success()
        .stdout(predicate::str::contains("Resuming session (2 sets recorded)"))
        .stdout(predicate::str::contains("yoga_flow set 1"))
        .stdout(predicate::str::contains("plank set 1"));
}

#[test]
fn test_session_finish_reports_completion_state() {
    let dir = setup_test_dir();
    run(&dir, "2024-03-04", &["enroll", "ada"]).success();
    run(&dir, "2024-03-04", &["session", "start", "ada", "recovery"]).success();
    run(&dir, "2024-03-04", &["session", "set", "ada", "recovery", "yoga_flow", "1", "1"]).success();

    run(&dir, "2024-03-04", &["session", "finish", "ada", "recovery"])
        .failure()
        .stderr(predicate::str::contains("1 of 5 sets"));

    run(&dir, "2024-03-04", &["session", "set", "ada", "recovery", "yoga_flow", "2", "1"]).success();
    run(&dir, "2024-03-04", &["session", "set", "ada", "recovery", "plank", "1", "1"]).success();
    run(&dir, "2024-03-04", &["session", "set", "ada", "recovery", "plank", "2", "1"]).success();
    run(&dir, "2024-03-04", &["session", "set", "ada", "recovery", "plank", "3", "1"]).success();

    run(&dir, "2024-03-04", &["session", "finish", "ada", "recovery"])
        .success()
        .stdout(predicate::str::contains("already completed"));
}

#[test]
fn test_leaderboard_orders_members() {
    let dir = setup_test_dir();
    run(&dir, "2024-03-04", &["enroll", "ada"]).success();
    run(&dir, "2024-03-04", &["enroll", "bob"]).success();
    run(&dir, "2024-03-04", &["log-set", "ada", "bench_press", "10"]).success();
    run(&dir, "2024-03-04", &["log-set", "ada", "bench_press", "10"]).success();
    run(&dir, "2024-03-04", &["log-set", "bob", "deadlift", "5"]).success();

    run(&dir, "2024-03-04", &["leaderboard", "reps"])
        .success()
        .stdout(predicate::str::contains("1. ada (ada)  20"))
        .stdout(predicate::str::contains("2. bob (bob)  5"));

    run(&dir, "2024-03-04", &["leaderboard", "exp", "--limit", "1"])
        .success()
        .stdout(predicate::str::contains("ada"))
        .stdout(predicate::str::contains("bob").not());
}

#[test]
fn test_session_load_recommendation() {
    let dir = setup_test_dir();
    run(&dir, "2024-03-04", &["enroll", "ada"]).success();
    run(&dir, "2024-03-04", &["session", "start", "ada", "push_day"]).success();

    // Target for bench_press in push_day is 8 reps; 15 is well above the band
    run(
        &dir,
        "2024-03-04",
        &["session", "set", "ada", "push_day", "bench_press", "1", "15", "--load", "60"],
    )
    .success();

    run(
        &dir,
        "2024-03-04",
        &["session", "recommend", "ada", "push_day", "bench_press"],
    )
    .success()
    .stdout(predicate::str::contains("66.0 kg"))
    .stdout(predicate::str::contains("Increase"));
}

#[test]
fn test_assessment_sets_rank() {
    let dir = setup_test_dir();
    run(&dir, "2024-03-04", &["enroll", "ada"]).success();

    run(
        &dir,
        "2024-03-04",
        &[
            "assess",
            "ada",
            "push-ups=42",
            "squats=65",
            "sit-ups=55",
            "high-jump=48",
            "sprint=15.2",
        ],
    )
    .success()
    .stdout(predicate::str::contains("Overall: B (440 points"));

    run(&dir, "2024-03-04", &["progress", "ada"])
        .success()
        .stdout(predicate::str::contains("Rank B"));
}

#[test]
fn test_check_out_long_visit_bonus() {
    let dir = setup_test_dir();
    run(&dir, "2024-03-04", &["enroll", "ada"]).success();
    run(&dir, "2024-03-04", &["check-in", "ada"]).success();

    // --date pins both commands to noon, so the visit has zero duration
    run(&dir, "2024-03-04", &["check-out", "ada"])
        .success()
        .stdout(predicate::str::contains("after 0 minutes"));

    run(&dir, "2024-03-04", &["check-out", "ada"])
        .failure()
        .stderr(predicate::str::contains("already checked out"));
}

#[test]
fn test_unknown_member_fails() {
    let dir = setup_test_dir();
    run(&dir, "2024-03-04", &["check-in", "ghost"])
        .failure()
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn test_history_lists_activity() {
    let dir = setup_test_dir();
    run(&dir, "2024-03-04", &["enroll", "ada"]).success();
    run(&dir, "2024-03-04", &["check-in", "ada"]).success();
    run(&dir, "2024-03-04", &["log-set", "ada", "back_squat", "8"]).success();

    run(&dir, "2024-03-04", &["history", "ada"])
        .success()
        .stdout(predicate::str::contains("check-in"))
        .stdout(predicate::str::contains("back_squat"));
}

#[test]
fn test_state_persists_across_invocations() {
    let dir = setup_test_dir();
    run(&dir, "2024-03-04", &["enroll", "ada"]).success();
    run(&dir, "2024-03-04", &["check-in", "ada"]).success();
    run(&dir, "2024-03-04", &["log-set", "ada", "deadlift", "5"]).success();

    // A fresh process sees the accumulated state
    run(&dir, "2024-03-04", &["progress", "ada"])
        .success()
        .stdout(predicate::str::contains("1 sets, 5 reps"));

    let state = fs::read_to_string(dir.path().join("state.json")).unwrap();
    assert!(state.contains("\"ada\""));
}

#[test]
fn test_corrupt_state_file_is_an_error() {
    let dir = setup_test_dir();
    fs::write(dir.path().join("state.json"), "{ not json }").unwrap();

    run(&dir, "2024-03-04", &["enroll", "ada"])
        .failure()
        .stderr(predicate::str::contains("corrupt"));
}
