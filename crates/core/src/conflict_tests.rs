// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::panic)]

use super::*;
use crate::mutation::OperationKind;
use crate::payload::Collection;
use chrono::{Duration, TimeZone};
use serde_json::{json, Value};
use yare::parameterized;

fn t1() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 10, 9, 0, 0).unwrap()
}

fn obj(value: Value) -> Payload {
    value.as_object().unwrap().clone()
}

fn local(payload: Value, at: DateTime<Utc>) -> QueuedMutation {
    QueuedMutation::new(
        "mut-1".into(),
        1,
        OperationKind::Update,
        Collection::Grades,
        obj(payload),
        0,
        3,
        at,
    )
}

fn server(fields: Value, at: DateTime<Utc>) -> ServerRecord {
    ServerRecord::new("g-1", at, obj(fields))
}

#[parameterized(
    local_wins = { "local_wins", ConflictStrategy::LocalWins },
    local_wins_dash = { "local-wins", ConflictStrategy::LocalWins },
    server_wins = { "SERVER_WINS", ConflictStrategy::ServerWins },
    merge = { "merge", ConflictStrategy::Merge },
    manual = { "manual", ConflictStrategy::Manual },
)]
fn strategy_from_str_valid(input: &str, expected: ConflictStrategy) {
    assert_eq!(input.parse::<ConflictStrategy>().unwrap(), expected);
}

#[test]
fn strategy_from_str_invalid() {
    assert!(matches!(
        "newest".parse::<ConflictStrategy>(),
        Err(Error::InvalidStrategy(_))
    ));
}

#[test]
fn default_strategy_is_manual() {
    assert_eq!(ConflictStrategy::default(), ConflictStrategy::Manual);
}

#[test]
fn strategy_serializes_snake_case() {
    let json = serde_json::to_string(&ConflictStrategy::ServerWins).unwrap();
    assert_eq!(json, "\"server_wins\"");
}

#[parameterized(
    server_newer = { 60, true },
    same_instant = { 0, false },
    server_older = { -60, false },
)]
fn detect_compares_timestamps(offset_secs: i64, expected: bool) {
    let l = local(json!({"id": "g-1", "score": 90}), t1());
    let s = server(json!({"score": 80}), t1() + Duration::seconds(offset_secs));
    assert_eq!(detect_conflict(&l, Some(&s)), expected);
}

#[test]
fn no_server_record_is_no_conflict() {
    let l = local(json!({"id": "g-1", "score": 90}), t1());
    assert!(!detect_conflict(&l, None));
}

#[test]
fn different_record_is_no_conflict() {
    let l = local(json!({"id": "g-2", "score": 90}), t1());
    let s = server(json!({"score": 80}), t1() + Duration::hours(1));
    assert!(!detect_conflict(&l, Some(&s)));
}

#[test]
fn local_without_identity_is_no_conflict() {
    let l = local(json!({"score": 90}), t1());
    let s = server(json!({"score": 80}), t1() + Duration::hours(1));
    assert!(!detect_conflict(&l, Some(&s)));
}

#[test]
fn local_wins_takes_local_fields_on_server_identity() {
    let l = local(json!({"id": "g-1", "score": 90}), t1());
    let s = server(json!({"subject": "math", "score": 80}), t1() + Duration::hours(1));

    let resolution = resolve(&l, &s, ConflictStrategy::LocalWins);
    assert_eq!(resolution, Resolution::Reapply(obj(json!({"id": "g-1", "score": 90}))));
}

#[test]
fn server_wins_discards_local() {
    let l = local(json!({"id": "g-1", "score": 90}), t1());
    let s = server(json!({"score": 80}), t1() + Duration::hours(1));

    let resolution = resolve(&l, &s, ConflictStrategy::ServerWins);
    assert_eq!(resolution, Resolution::Discard(obj(json!({"id": "g-1", "score": 80}))));
}

#[test]
fn merge_with_newer_server_keeps_server_values() {
    let l = local(json!({"id": "g-1", "score": 90}), t1());
    let s = server(
        json!({"subject": "Budi", "score": 80}),
        t1() + Duration::hours(1),
    );

    let resolution = resolve(&l, &s, ConflictStrategy::Merge);
    assert_eq!(
        resolution.record().unwrap(),
        &obj(json!({"id": "g-1", "subject": "Budi", "score": 80}))
    );
    assert!(matches!(resolution, Resolution::Reapply(_)));
}

#[test]
fn merge_with_newer_local_keeps_local_values() {
    let l = local(json!({"id": "g-1", "score": 90}), t1() + Duration::hours(1));
    let s = server(json!({"subject": "Budi", "score": 80}), t1());

    let resolution = resolve(&l, &s, ConflictStrategy::Merge);
    assert_eq!(
        resolution.record().unwrap(),
        &obj(json!({"id": "g-1", "subject": "Budi", "score": 90}))
    );
}

#[test]
fn merge_keeps_fields_only_local_has() {
    let l = local(json!({"id": "g-1", "note": "remedial"}), t1());
    let s = server(json!({"score": 80}), t1() + Duration::hours(1));

    let resolution = resolve(&l, &s, ConflictStrategy::Merge);
    assert_eq!(
        resolution.record().unwrap(),
        &obj(json!({"id": "g-1", "score": 80, "note": "remedial"}))
    );
}

#[test]
fn manual_returns_both_versions() {
    let l = local(json!({"id": "g-1", "score": 90}), t1());
    let s = server(json!({"score": 80}), t1() + Duration::hours(1));

    match resolve(&l, &s, ConflictStrategy::Manual) {
        Resolution::ManualRequired { local, server } => {
            assert_eq!(local, obj(json!({"id": "g-1", "score": 90})));
            assert_eq!(server, s);
        }
        other => panic!("expected manual resolution, got {other:?}"),
    }
}

#[test]
fn server_record_payload_includes_identity() {
    let s = server(json!({"score": 80}), t1());
    assert_eq!(s.to_payload(), obj(json!({"id": "g-1", "score": 80})));
}
