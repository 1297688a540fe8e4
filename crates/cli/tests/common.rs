// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Shared across test binaries; not every file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use chrono::{Duration, Utc};
use gs_core::{
    Collection, MutationStatus, OperationKind, QueuedMutation, ServerRecord,
};
use gs_sync::store::SqliteStore;
use gs_sync::QueueStore;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// `gsq` pointed at `state`, with colors off and the environment isolated.
pub fn gsq(state: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("gsq");
    cmd.env("GURUSYNC_STATE_DIR", state.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

/// Queues a student update and returns its id.
pub fn enqueue_student(state: &TempDir, id: &str, priority: i32) -> String {
    let output = gsq(state)
        .args(["enqueue", "students", "update"])
        .arg(format!(r#"{{"id": "{id}", "name": "Ani"}}"#))
        .args(["--priority", &priority.to_string()])
        .output()
        .unwrap();
    assert!(output.status.success(), "enqueue failed: {output:?}");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Writes items straight into the state directory's database, as a sync
/// engine would leave them.
pub fn seed(state: &TempDir, items: &[QueuedMutation]) {
    let store = SqliteStore::open(&state.path().join("gurusync.db")).unwrap();
    store.save_queue(items).unwrap();
}

/// A student update parked on a conflict with a newer server copy.
pub fn conflicted(sequence: u64, record: &str) -> QueuedMutation {
    let captured = Utc::now() - Duration::minutes(5);
    let mut item = QueuedMutation::new(
        format!("mut-{sequence:016x}"),
        sequence,
        OperationKind::Update,
        Collection::Students,
        serde_json::json!({"id": record, "name": "Ani"})
            .as_object()
            .unwrap()
            .clone(),
        0,
        3,
        captured,
    );
    item.status = MutationStatus::Failed;
    item.last_error = Some(format!("conflict: server modified {record}"));
    item.conflict_snapshot = Some(ServerRecord::new(
        record,
        captured + Duration::minutes(1),
        serde_json::json!({"name": "Budi"})
            .as_object()
            .unwrap()
            .clone(),
    ));
    item
}

/// A write that exhausted its retries.
pub fn exhausted(sequence: u64, record: &str) -> QueuedMutation {
    let mut item = conflicted(sequence, record);
    item.conflict_snapshot = None;
    item.retry_count = item.max_retries;
    item.last_error = Some("503 service unavailable".to_string());
    item
}
