//! Behavioral tests for the staleness gate

use chrono::Utc;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use fleetdex::search::FreshnessGate;

fn gate_at(dir: &Path, ttl_secs: u64) -> (FreshnessGate, PathBuf) {
    let state_path = dir.join("last_refresh");
    (FreshnessGate::new(&state_path, ttl_secs), state_path)
}

fn persisted_epoch(state_path: &Path) -> i64 {
    std::fs::read_to_string(state_path)
        .expect("state file should exist")
        .trim()
        .parse()
        .expect("state file should hold an epoch")
}

#[test]
fn first_run_is_stale_and_advances_state() {
    let dir = TempDir::new().unwrap();
    let (gate, state_path) = gate_at(dir.path(), 300);

    assert!(!state_path.exists());
    assert!(gate.should_refresh().unwrap());

    // The verdict persisted "now" before any caller-side refresh happened.
    let written = persisted_epoch(&state_path);
    assert!((Utc::now().timestamp() - written).abs() <= 5);
}

#[test]
fn second_call_within_ttl_is_fresh() {
    let dir = TempDir::new().unwrap();
    let (gate, state_path) = gate_at(dir.path(), 300);

    assert!(gate.should_refresh().unwrap());
    let first_written = persisted_epoch(&state_path);

    assert!(!gate.should_refresh().unwrap());
    // A fresh verdict must not rewrite the state.
    assert_eq!(persisted_epoch(&state_path), first_written);
}

#[test]
fn recent_external_state_suppresses_refresh() {
    let dir = TempDir::new().unwrap();
    let (gate, state_path) = gate_at(dir.path(), 1000);

    let recent = Utc::now().timestamp() - 500;
    std::fs::write(&state_path, format!("{recent}\n")).unwrap();

    assert!(!gate.should_refresh().unwrap());
}

#[test]
fn elapsed_beyond_ttl_triggers_refresh() {
    let dir = TempDir::new().unwrap();
    let (gate, state_path) = gate_at(dir.path(), 300);

    let old = Utc::now().timestamp() - 301;
    std::fs::write(&state_path, format!("{old}\n")).unwrap();

    assert!(gate.should_refresh().unwrap());
    assert!(persisted_epoch(&state_path) > old);
}

#[test]
fn elapsed_far_beyond_a_day_still_triggers_refresh() {
    let dir = TempDir::new().unwrap();
    let (gate, state_path) = gate_at(dir.path(), 300);

    // More than 24h ago; total elapsed seconds decide, not the sub-day part.
    let old = Utc::now().timestamp() - 86_400 - 30;
    std::fs::write(&state_path, format!("{old}\n")).unwrap();

    assert!(gate.should_refresh().unwrap());
}

#[test]
fn corrupt_state_counts_as_stale() {
    let dir = TempDir::new().unwrap();
    let (gate, state_path) = gate_at(dir.path(), 300);

    std::fs::write(&state_path, "definitely not an epoch").unwrap();

    assert!(gate.should_refresh().unwrap());
    // Corrupt contents were replaced with a parsable epoch.
    let written = persisted_epoch(&state_path);
    assert!((Utc::now().timestamp() - written).abs() <= 5);
}

#[test]
fn empty_state_counts_as_stale() {
    let dir = TempDir::new().unwrap();
    let (gate, state_path) = gate_at(dir.path(), 300);

    std::fs::write(&state_path, "").unwrap();

    assert!(gate.should_refresh().unwrap());
}

#[test]
fn zero_ttl_refreshes_on_first_call() {
    let dir = TempDir::new().unwrap();
    let (gate, _) = gate_at(dir.path(), 0);

    assert!(gate.should_refresh().unwrap());
}

#[test]
fn unwritable_state_path_is_fatal() {
    let dir = TempDir::new().unwrap();
    // Using a directory as the state path makes the persist step fail.
    let state_path = dir.path().join("state-as-dir");
    std::fs::create_dir(&state_path).unwrap();

    let gate = FreshnessGate::new(&state_path, 300);
    assert!(gate.should_refresh().is_err());
}
