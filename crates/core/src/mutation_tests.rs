// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::{Duration, TimeZone};
use serde_json::json;
use yare::parameterized;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
}

fn item(sequence: u64, priority: i32) -> QueuedMutation {
    let payload = json!({"id": "stu-1", "name": "Ani"});
    QueuedMutation::new(
        format!("mut-{sequence}"),
        sequence,
        OperationKind::Update,
        Collection::Students,
        payload.as_object().unwrap().clone(),
        priority,
        3,
        t0(),
    )
}

#[parameterized(
    create = { "create", OperationKind::Create },
    update = { "update", OperationKind::Update },
    upsert = { "upsert", OperationKind::Upsert },
    delete = { "delete", OperationKind::Delete },
    upper = { "DELETE", OperationKind::Delete },
)]
fn operation_kind_from_str_valid(input: &str, expected: OperationKind) {
    assert_eq!(input.parse::<OperationKind>().unwrap(), expected);
}

#[parameterized(
    unknown = { "patch" },
    empty = { "" },
)]
fn operation_kind_from_str_invalid(input: &str) {
    assert!(input.parse::<OperationKind>().is_err());
}

#[parameterized(
    create = { OperationKind::Create, false, true },
    update = { OperationKind::Update, true, false },
    upsert = { OperationKind::Upsert, true, true },
    delete = { OperationKind::Delete, true, false },
)]
fn operation_kind_identity_rules(kind: OperationKind, needs_id: bool, creates: bool) {
    assert_eq!(kind.requires_identity(), needs_id);
    assert_eq!(kind.may_create(), creates);
}

#[parameterized(
    pending = { "pending", MutationStatus::Pending },
    processing = { "processing", MutationStatus::Processing },
    failed = { "failed", MutationStatus::Failed },
    success = { "success", MutationStatus::Success },
    mixed = { "Failed", MutationStatus::Failed },
)]
fn status_from_str_valid(input: &str, expected: MutationStatus) {
    assert_eq!(input.parse::<MutationStatus>().unwrap(), expected);
    assert_eq!(expected.to_string(), input.to_lowercase());
}

#[test]
fn status_from_str_invalid() {
    assert!("done".parse::<MutationStatus>().is_err());
}

#[test]
fn new_item_starts_pending_with_full_budget() {
    let m = item(1, 0);
    assert_eq!(m.status, MutationStatus::Pending);
    assert_eq!(m.retry_count, 0);
    assert_eq!(m.max_retries, 3);
    assert_eq!(m.local_timestamp, t0());
    assert!(m.last_error.is_none());
    assert!(!m.has_conflict());
}

#[test]
fn record_id_reads_identity_field() {
    assert_eq!(item(1, 0).record_id(), Some("stu-1"));

    let mut anonymous = item(2, 0);
    anonymous.payload.remove("id");
    assert_eq!(anonymous.record_id(), None);
}

#[test]
fn queue_order_prefers_priority_then_sequence() {
    let mut items = vec![item(1, 0), item(2, 5), item(3, 0), item(4, 5)];
    items.sort_by(|a, b| a.queue_order(b));
    let order: Vec<u64> = items.iter().map(|m| m.sequence).collect();
    assert_eq!(order, vec![2, 4, 1, 3]);
}

#[test]
fn is_ready_respects_schedule_and_status() {
    let mut m = item(1, 0);
    assert!(m.is_ready(t0()));

    m.next_attempt_at = Some(t0() + Duration::seconds(2));
    assert!(!m.is_ready(t0() + Duration::seconds(1)));
    assert!(m.is_ready(t0() + Duration::seconds(2)));

    m.status = MutationStatus::Failed;
    assert!(!m.is_ready(t0() + Duration::seconds(10)));
}

#[test]
fn retries_exhausted_at_budget() {
    let mut m = item(1, 0);
    m.retry_count = 2;
    assert!(!m.retries_exhausted());
    m.retry_count = 3;
    assert!(m.retries_exhausted());
}

#[test]
fn reset_for_retry_clears_failure_state() {
    let mut m = item(1, 0);
    m.status = MutationStatus::Failed;
    m.retry_count = 3;
    m.next_attempt_at = Some(t0());
    m.conflict_snapshot = Some(ServerRecord::new("stu-1", t0(), Payload::new()));
    assert!(m.has_conflict());

    m.reset_for_retry();
    assert_eq!(m.status, MutationStatus::Pending);
    assert_eq!(m.retry_count, 0);
    assert!(m.next_attempt_at.is_none());
    assert!(!m.has_conflict());
}

#[test]
fn optional_fields_are_omitted_from_json() {
    let json = serde_json::to_value(item(1, 0)).unwrap();
    let obj = json.as_object().unwrap();
    assert!(!obj.contains_key("last_error"));
    assert!(!obj.contains_key("conflict_snapshot"));
    assert_eq!(obj["operation"], "update");
    assert_eq!(obj["collection"], "students");
}

#[test]
fn mutation_id_format() {
    let id = generate_mutation_id("device-a", &t0(), 7);
    assert!(id.starts_with("mut-"));
    assert_eq!(id.len(), 4 + 16);
    assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn mutation_id_depends_on_every_input() {
    let base = generate_mutation_id("device-a", &t0(), 7);
    assert_eq!(base, generate_mutation_id("device-a", &t0(), 7));
    assert_ne!(base, generate_mutation_id("device-b", &t0(), 7));
    assert_ne!(base, generate_mutation_id("device-a", &t0(), 8));
    assert_ne!(
        base,
        generate_mutation_id("device-a", &(t0() + Duration::milliseconds(1)), 7)
    );
}
