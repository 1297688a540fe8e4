// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use gs_core::{MutationStatus, QueuedMutation, SyncLogRecord};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Short age like `45s`, `12m`, `3h` or `2d`.
pub fn format_age(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - since).num_seconds().max(0);
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86_399 => format!("{}h", secs / 3600),
        _ => format!("{}d", secs / 86_400),
    }
}

/// `collection/record`, or `collection/(new)` for creates without an id.
pub fn target(item: &QueuedMutation) -> String {
    format!(
        "{}/{}",
        item.collection,
        item.record_id().unwrap_or("(new)")
    )
}

/// One-line summary used by `list`.
///
/// ```text
/// mut-3f2a9c01d4e5b6a7  pending     p5   update  students/s1  retry 1/3
/// ```
pub fn format_item(item: &QueuedMutation) -> String {
    let mut line = format!(
        "{}  {:<10}  p{:<3} {:<7} {}",
        item.id,
        status_label(item),
        item.priority,
        item.operation.as_str(),
        target(item)
    );
    if item.retry_count > 0 {
        line.push_str(&format!("  retry {}/{}", item.retry_count, item.max_retries));
    }
    line
}

fn status_label(item: &QueuedMutation) -> &'static str {
    if item.has_conflict() {
        "conflict"
    } else {
        item.status.as_str()
    }
}

/// Every field of an item, for `show` and `failed`.
pub fn format_item_detail(item: &QueuedMutation) -> Vec<String> {
    let mut lines = vec![
        format!("{}  {}", item.id, status_label(item)),
        format!("  operation: {} {}", item.operation, target(item)),
        format!("  priority:  {}", item.priority),
        format!(
            "  captured:  {}",
            item.local_timestamp.format(TIME_FORMAT)
        ),
        format!("  retries:   {}/{}", item.retry_count, item.max_retries),
    ];
    if let Some(at) = item.last_attempt_at {
        lines.push(format!("  attempted: {}", at.format(TIME_FORMAT)));
    }
    if let (MutationStatus::Pending, Some(at)) = (item.status, item.next_attempt_at) {
        lines.push(format!("  next try:  {}", at.format(TIME_FORMAT)));
    }
    if let Some(error) = &item.last_error {
        lines.push(format!("  error:     {error}"));
    }
    lines.push("  payload:".to_string());
    lines.extend(indented_json(&serde_json::Value::Object(item.payload.clone())));
    if let Some(server) = &item.conflict_snapshot {
        lines.push(format!(
            "  server copy (modified {}):",
            server.last_modified.format(TIME_FORMAT)
        ));
        lines.extend(indented_json(&serde_json::Value::Object(server.to_payload())));
    }
    lines
}

fn indented_json(value: &serde_json::Value) -> Vec<String> {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|_| value.to_string())
        .lines()
        .map(|l| format!("    {l}"))
        .collect()
}

/// One sync log line.
pub fn format_log_record(record: &SyncLogRecord) -> String {
    let mut line = format!(
        "{}  {:<8} {:<7} {:<11} {}",
        record.timestamp.format(TIME_FORMAT),
        record.result.as_str(),
        record.operation.as_str(),
        record.collection.as_str(),
        record.item_id
    );
    if let Some(error) = &record.error {
        line.push_str(&format!("  ({error})"));
    }
    line
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
