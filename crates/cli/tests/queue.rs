// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

mod common;
use common::*;

#[test]
fn status_on_a_fresh_state_dir() {
    let state = TempDir::new().unwrap();
    gsq(&state)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("pending:    0"))
        .stdout(predicate::str::contains("store:      sqlite"));
}

#[test]
fn enqueue_then_list_in_priority_order() {
    let state = TempDir::new().unwrap();
    let low = enqueue_student(&state, "s1", 0);
    let high = enqueue_student(&state, "s2", 5);
    assert!(low.starts_with("mut-"));

    let output = gsq(&state).arg("list").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(&high));
    assert!(lines[1].starts_with(&low));
}

#[test]
fn invalid_payload_is_refused() {
    let state = TempDir::new().unwrap();
    gsq(&state)
        .args(["enqueue", "grades", "create", r#"{"score": 90}"#])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("student_id"));

    gsq(&state)
        .args(["list", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn malformed_json_is_refused_with_a_hint() {
    let state = TempDir::new().unwrap();
    gsq(&state)
        .args(["enqueue", "students", "update", "{id: s1}"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid payload JSON"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn unknown_collection_is_a_usage_error() {
    let state = TempDir::new().unwrap();
    gsq(&state)
        .args(["enqueue", "pupils", "create", "{}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pupils"));
}

#[test]
fn discard_and_clear() {
    let state = TempDir::new().unwrap();
    let first = enqueue_student(&state, "s1", 0);
    enqueue_student(&state, "s2", 0);
    enqueue_student(&state, "s3", 0);

    gsq(&state)
        .args(["discard", &first])
        .assert()
        .success()
        .stdout(predicate::str::contains("students/s1"));
    gsq(&state)
        .arg("clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dropped 2 queued writes"));
    gsq(&state)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Queue is empty"));
}

#[test]
fn discard_unknown_id_fails() {
    let state = TempDir::new().unwrap();
    gsq(&state)
        .args(["discard", "mut-0000000000000000"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("mutation not found"));
}

#[test]
fn retry_failed_and_clear_failed() {
    let state = TempDir::new().unwrap();
    seed(&state, &[exhausted(1, "s1"), exhausted(2, "s2")]);

    gsq(&state)
        .args(["list", "-s", "failed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("retry 3/3"));
    gsq(&state)
        .arg("retry-failed")
        .assert()
        .success()
        .stdout(predicate::str::contains("Requeued 2 writes"));
    gsq(&state)
        .arg("clear-failed")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dropped 0 failed writes"));

    let output = gsq(&state).args(["status", "-o", "json"]).output().unwrap();
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["pending"], 2);
    assert_eq!(status["failed"], 0);
}

#[test]
fn log_starts_empty() {
    let state = TempDir::new().unwrap();
    gsq(&state)
        .arg("log")
        .assert()
        .success()
        .stdout(predicate::str::contains("No sync attempts recorded"));
    gsq(&state)
        .args(["log", "--clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sync log cleared"));
}

#[test]
fn cache_commands_on_an_empty_cache() {
    let state = TempDir::new().unwrap();
    gsq(&state)
        .args(["cache", "purge"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Purged 0 expired entries"));
    gsq(&state)
        .args(["cache", "clear", "-c", "grades"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 0 cached grades reads"));
}

#[test]
fn config_init_then_show() {
    let state = TempDir::new().unwrap();
    gsq(&state)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Wrote"));
    gsq(&state)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_retries = 3"))
        .stdout(predicate::str::contains("conflict_strategy = \"manual\""));
}

#[test]
fn state_dir_flag_overrides_environment() {
    let env_state = TempDir::new().unwrap();
    let flag_state = TempDir::new().unwrap();

    gsq(&env_state)
        .arg("--state-dir")
        .arg(flag_state.path())
        .args(["enqueue", "tasks", "delete", r#"{"id": "task-9"}"#])
        .assert()
        .success();

    assert!(flag_state.path().join("gurusync.db").exists());
    assert!(!env_state.path().join("gurusync.db").exists());
}
