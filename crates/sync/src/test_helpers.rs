// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use gs_core::{
    Collection, ManualClock, MutationStatus, OperationKind, Payload, QueuedMutation, ServerRecord,
};
use serde_json::Value;

use crate::remote::{ApplyOutcome, RemoteApply};

/// A fixed instant all fixtures start from.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 12, 7, 0, 0).unwrap()
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(t0()))
}

pub fn payload(value: Value) -> Payload {
    value.as_object().unwrap().clone()
}

/// A pending `students` update for record `stu-{sequence}`.
pub fn mutation(sequence: u64, priority: i32) -> QueuedMutation {
    QueuedMutation::new(
        format!("mut-{sequence:016x}"),
        sequence,
        OperationKind::Update,
        Collection::Students,
        payload(serde_json::json!({"id": format!("stu-{sequence}"), "name": "Ani"})),
        priority,
        3,
        t0(),
    )
}

/// The same mutation with every optional field filled in.
pub fn decorated_mutation(sequence: u64) -> QueuedMutation {
    let mut item = mutation(sequence, 2);
    item.status = MutationStatus::Failed;
    item.retry_count = 1;
    item.last_attempt_at = Some(t0());
    item.last_error = Some("conflict".into());
    item.next_attempt_at = Some(t0());
    item.conflict_snapshot = Some(ServerRecord::new(
        format!("stu-{sequence}"),
        t0(),
        payload(serde_json::json!({"name": "Budi"})),
    ));
    item
}

/// Remote that replays scripted outcomes, then answers with a default.
pub struct MockRemote {
    script: Mutex<VecDeque<ApplyOutcome>>,
    fallback: ApplyOutcome,
    calls: Mutex<Vec<QueuedMutation>>,
}

impl MockRemote {
    /// Accepts everything.
    pub fn accepting() -> Arc<Self> {
        Self::with_default(ApplyOutcome::Success(None))
    }

    /// Fails every call with a transient error.
    pub fn failing() -> Arc<Self> {
        Self::with_default(ApplyOutcome::Failure("503 service unavailable".into()))
    }

    pub fn with_default(fallback: ApplyOutcome) -> Arc<Self> {
        Arc::new(MockRemote {
            script: Mutex::new(VecDeque::new()),
            fallback,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Queues `outcome` to be returned by the next unscripted call.
    pub fn push(&self, outcome: ApplyOutcome) {
        self.script.lock().unwrap().push_back(outcome);
    }

    /// Every item the remote was asked to apply, in call order.
    pub fn calls(&self) -> Vec<QueuedMutation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl RemoteApply for MockRemote {
    fn apply<'a>(
        &'a self,
        item: &'a QueuedMutation,
    ) -> Pin<Box<dyn Future<Output = ApplyOutcome> + Send + 'a>> {
        self.calls.lock().unwrap().push(item.clone());
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        Box::pin(async move { outcome })
    }
}
