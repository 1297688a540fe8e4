// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::testing::TestContext;

#[test]
fn json_reports_counts_and_store() {
    let mut ctx = TestContext::new();
    ctx.student("s1", 0);
    let failed = ctx.student("s2", 0);
    ctx.fail(&failed);
    ctx.conflict("s3");

    let out = ctx.capture(|ws, out| run(ws, out, OutputFormat::Json));
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(value["pending"], 1);
    assert_eq!(value["failed"], 2);
    assert_eq!(value["conflicted"], 1);
    assert_eq!(value["store"], "memory");
    assert_eq!(value["durable"], false);
    assert!(value["oldest_pending"].is_string());
}

#[test]
fn text_warns_about_volatile_store() {
    let ctx = TestContext::new();
    let out = ctx.capture(|ws, out| run(ws, out, OutputFormat::Text));

    assert!(out.contains("pending:    0"));
    assert!(out.contains("store:      memory"));
    assert!(out.contains("will not survive a restart"));
    assert!(!out.contains("oldest:"));
}

#[test]
fn text_points_at_resolve_when_conflicted() {
    let mut ctx = TestContext::new();
    ctx.conflict("s1");
    let out = ctx.capture(|ws, out| run(ws, out, OutputFormat::Text));
    assert!(out.contains("conflicts:  1"));
    assert!(out.contains("gsq resolve"));
}
