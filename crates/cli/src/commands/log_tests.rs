// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::testing::TestContext;
use chrono::{Duration, TimeZone, Utc};
use gs_core::{Collection, OperationKind, SyncLogRecord, SyncOutcome};
use gs_sync::QueueStore;

fn seed(ctx: &TestContext, n: i64) {
    let start = Utc.with_ymd_and_hms(2026, 1, 12, 7, 0, 0).unwrap();
    for i in 0..n {
        ctx.store
            .append_log(&SyncLogRecord {
                item_id: format!("mut-{i:016x}"),
                operation: OperationKind::Update,
                collection: Collection::Grades,
                result: SyncOutcome::Failed,
                timestamp: start + Duration::seconds(i),
                error: Some(format!("attempt {i}")),
            })
            .unwrap();
    }
}

#[test]
fn empty_log_says_so() {
    let ctx = TestContext::new();
    let out = ctx.capture(|ws, out| run(ws, out, 20));
    assert_eq!(out.trim(), "No sync attempts recorded");
}

#[test]
fn shows_newest_first_up_to_limit() {
    let ctx = TestContext::new();
    seed(&ctx, 5);

    let out = ctx.capture(|ws, out| run(ws, out, 2));
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("(attempt 4)"));
    assert!(lines[1].contains("(attempt 3)"));
}

#[test]
fn clear_empties_the_log() {
    let ctx = TestContext::new();
    seed(&ctx, 3);

    ctx.capture(|ws, out| clear(ws, out));

    assert!(ctx.store.read_log(10).unwrap().is_empty());
}
