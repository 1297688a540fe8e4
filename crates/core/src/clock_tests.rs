// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::TimeZone;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 7, 30, 0).unwrap()
}

#[test]
fn manual_clock_is_frozen_until_advanced() {
    let clock = ManualClock::new(start());
    assert_eq!(clock.now(), start());
    assert_eq!(clock.now(), start());

    clock.advance(Duration::seconds(90));
    assert_eq!(clock.now(), start() + Duration::seconds(90));
}

#[test]
fn manual_clock_accepts_std_durations() {
    let clock = ManualClock::new(start());
    clock.advance_std(std::time::Duration::from_millis(1500));
    assert_eq!(clock.now(), start() + Duration::milliseconds(1500));
}

#[test]
fn manual_clock_set_jumps() {
    let clock = ManualClock::new(start());
    let later = start() + Duration::days(3);
    clock.set(later);
    assert_eq!(clock.now(), later);
}

#[test]
fn shared_clock_reads_through_arc() {
    let clock = Arc::new(ManualClock::new(start()));
    let source: Arc<dyn ClockSource> = clock.clone();
    clock.advance(Duration::minutes(1));
    assert_eq!(source.now(), start() + Duration::minutes(1));
}

#[test]
fn system_clock_moves_forward() {
    let a = SystemClock.now();
    let b = SystemClock.now();
    assert!(b >= a);
}

#[test]
fn offset_adds_std_duration() {
    let at = offset(start(), std::time::Duration::from_secs(30));
    assert_eq!(at, start() + Duration::seconds(30));
}

#[test]
fn offset_saturates_huge_durations() {
    let at = offset(start(), std::time::Duration::MAX);
    assert_eq!(at, start() + Duration::days(36_500));
}
