// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::testing::TestContext;
use gs_core::MutationStatus;
use yare::parameterized;

#[test]
fn prints_id_of_queued_item() {
    let ctx = TestContext::new();
    let out = ctx.capture(|ws, out| {
        run(
            ws,
            out,
            Collection::Attendance,
            OperationKind::Upsert,
            r#"{"id": "att-1", "student_id": "s1", "date": "2026-03-02", "status": "sick"}"#,
            Some(7),
        )
    });

    let id = out.trim();
    let item = ctx.ws.queue.get(id).unwrap();
    assert_eq!(item.status, MutationStatus::Pending);
    assert_eq!(item.priority, 7);
    assert_eq!(item.collection, Collection::Attendance);
}

#[test]
fn uses_configured_default_priority() {
    let ctx = TestContext::new();
    let out = ctx.capture(|ws, out| {
        run(
            ws,
            out,
            Collection::Tasks,
            OperationKind::Delete,
            r#"{"id": "task-9"}"#,
            None,
        )
    });
    assert_eq!(
        ctx.ws.queue.get(out.trim()).unwrap().priority,
        ctx.ws.config.default_priority
    );
}

#[parameterized(
    not_json = { "{name: Ani}" },
    not_an_object = { "[1, 2]" },
    missing_id = { r#"{"name": "Ani"}"# },
    unknown_field = { r#"{"id": "s1", "shoe_size": 42}"# },
)]
fn bad_payloads_are_not_queued(payload: &str) {
    let ctx = TestContext::new();
    let result = ctx.try_capture(|ws, out| {
        run(
            ws,
            out,
            Collection::Students,
            OperationKind::Update,
            payload,
            None,
        )
    });
    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(ctx.ws.queue.is_empty());
}
