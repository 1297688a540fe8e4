// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

fn bad_json() -> serde_json::Error {
    serde_json::from_str::<serde_json::Value>("{name:").unwrap_err()
}

#[test]
fn invalid_json_carries_a_hint() {
    let msg = Error::InvalidJson(bad_json()).to_string();
    assert!(msg.starts_with("invalid payload JSON"));
    assert!(msg.contains("hint:"));
}

#[test]
fn core_errors_pass_through_unchanged() {
    let core = gs_core::Error::UnknownCollection("pupils".into());
    let expected = core.to_string();
    assert_eq!(Error::from(core).to_string(), expected);
}

#[test]
fn sync_errors_pass_through_unchanged() {
    let err = Error::from(gs_sync::Error::MutationNotFound("mut-1".into()));
    assert!(err.to_string().contains("mut-1"));
}

#[test]
fn user_input_errors_exit_with_two() {
    assert_eq!(Error::InvalidJson(bad_json()).exit_code(), 2);
    assert_eq!(
        Error::from(gs_core::Error::InvalidStrategy("later".into())).exit_code(),
        2
    );
}

#[test]
fn other_errors_exit_with_one() {
    assert_eq!(
        Error::from(gs_sync::Error::NoConflict("mut-1".into())).exit_code(),
        1
    );
    let io = std::io::Error::other("disk full");
    assert_eq!(Error::from(io).exit_code(), 1);
}
