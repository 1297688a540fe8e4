// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::{Duration, TimeZone};
use serde_json::json;

#[test]
fn entry_expires_at_the_boundary() {
    let at = Utc.with_ymd_and_hms(2026, 4, 1, 10, 0, 0).unwrap();
    let entry = CacheEntry {
        key: "students:7A".into(),
        collection: "students".into(),
        value: json!([{"id": "stu-1"}]),
        cached_at: at,
        expires_at: at + Duration::minutes(5),
    };

    assert!(!entry.is_expired(at));
    assert!(!entry.is_expired(at + Duration::seconds(299)));
    assert!(entry.is_expired(at + Duration::minutes(5)));
}
