// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The sync processor: drains ready mutations against the remote.
//!
//! Per item the state machine is `Pending -> Processing -> {Success |
//! Pending(retry) | Failed}`. Items are serviced in queue order. A pass that
//! is requested while another one runs returns immediately; the running pass
//! keeps pulling ready items until none are left, so new work is not lost.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gs_core::{
    detect_conflict, offset, resolve, ClockSource, ConflictStrategy, MutationId, MutationStatus,
    QueuedMutation, Resolution, ServerRecord, SyncLogRecord, SyncOutcome,
};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backoff::Backoff;
use crate::cache::ReadCache;
use crate::config::ConflictPolicy;
use crate::error::Error;
use crate::queue::{requeue_resolved, MutationQueue};
use crate::remote::{ApplyOutcome, RemoteApply};

/// Phase of the most recent pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressState {
    #[default]
    Idle,
    Syncing,
    /// Last pass ended with nothing left in a failed state.
    Completed,
    /// Last pass left at least one item failed.
    Failed,
}

/// Live progress of a pass, published on a watch channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncProgress {
    pub total: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub state: ProgressState,
}

/// What one pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Remote calls made.
    pub attempted: usize,
    pub succeeded: usize,
    /// Items that ended the pass in `Failed`.
    pub failed: usize,
    /// Conflicts reported by the remote.
    pub conflicts: usize,
    /// Items dropped in favour of the server copy.
    pub discarded: usize,
    /// Items rescheduled after a transient failure or a repeated conflict,
    /// with their delay.
    pub retries: Vec<(MutationId, Duration)>,
}

enum Step {
    Done,
    /// Resolved payload goes straight back to the remote.
    Reapply,
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Replays queued mutations through a [`RemoteApply`].
pub struct SyncProcessor {
    queue: Arc<MutationQueue>,
    remote: Arc<dyn RemoteApply>,
    clock: Arc<dyn ClockSource>,
    backoff: Backoff,
    policy: ConflictPolicy,
    cache: Option<Arc<ReadCache>>,
    running: AtomicBool,
    progress: watch::Sender<SyncProgress>,
}

impl SyncProcessor {
    pub fn new(
        queue: Arc<MutationQueue>,
        remote: Arc<dyn RemoteApply>,
        clock: Arc<dyn ClockSource>,
        backoff: Backoff,
        policy: ConflictPolicy,
    ) -> Self {
        let (progress, _) = watch::channel(SyncProgress::default());
        SyncProcessor {
            queue,
            remote,
            clock,
            backoff,
            policy,
            cache: None,
            running: AtomicBool::new(false),
            progress,
        }
    }

    /// Invalidates `cache` entries of a collection after each write to it.
    pub fn with_cache(mut self, cache: Arc<ReadCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn progress(&self) -> watch::Receiver<SyncProgress> {
        self.progress.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Runs one pass over every ready item.
    ///
    /// Returns `None` without doing anything if a pass is already running.
    pub async fn drain(&self) -> Option<DrainReport> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("sync pass already running");
            return None;
        }
        let report = {
            let _guard = RunningGuard(&self.running);
            self.run_pass().await
        };
        self.progress.send_modify(|p| {
            p.state = if report.failed == 0 {
                ProgressState::Completed
            } else {
                ProgressState::Failed
            };
        });
        Some(report)
    }

    async fn run_pass(&self) -> DrainReport {
        let mut report = DrainReport::default();
        let mut seen: HashSet<MutationId> = HashSet::new();
        let total = self.queue.ready_count(self.clock.now(), &seen);
        self.progress.send_replace(SyncProgress {
            total,
            state: ProgressState::Syncing,
            ..SyncProgress::default()
        });
        debug!(total, "sync pass started");

        while let Some(item) = self.queue.next_ready(self.clock.now(), &seen) {
            seen.insert(item.id.clone());
            let failed_before = report.failed;
            let succeeded_before = report.succeeded;

            // A resolved conflict gets one immediate second attempt.
            let mut current = item;
            for round in 0..2 {
                if let Step::Done = self.attempt(&current, &mut report).await {
                    break;
                }
                if round == 1 {
                    self.defer_reapply(&current.id, &mut report);
                    break;
                }
                match self.queue.get(&current.id) {
                    Some(next) if next.status == MutationStatus::Pending => current = next,
                    _ => break,
                }
            }

            let ready = self.queue.ready_count(self.clock.now(), &seen);
            self.progress.send_modify(|p| {
                p.processed += 1;
                p.succeeded += report.succeeded - succeeded_before;
                p.failed += report.failed - failed_before;
                p.total = p.total.max(p.processed + ready);
            });
        }

        self.queue.prune_succeeded();
        info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed,
            conflicts = report.conflicts,
            retries = report.retries.len(),
            "sync pass finished"
        );
        report
    }

    async fn attempt(&self, item: &QueuedMutation, report: &mut DrainReport) -> Step {
        let now = self.clock.now();
        let item = match self.queue.modify(&item.id, |m| {
            m.status = MutationStatus::Processing;
            m.last_attempt_at = Some(now);
        }) {
            Ok(item) => item,
            Err(Error::MutationNotFound(id)) => {
                debug!(%id, "mutation discarded before it was applied");
                return Step::Done;
            }
            Err(e) => {
                warn!(error = %e, id = %item.id, "could not mark mutation processing");
                return Step::Done;
            }
        };

        report.attempted += 1;
        let outcome = self.remote.apply(&item).await;
        match outcome {
            ApplyOutcome::Success(_) => {
                self.on_success(&item, report);
                Step::Done
            }
            ApplyOutcome::Failure(message) => {
                self.on_failure(&item, message, report);
                Step::Done
            }
            ApplyOutcome::Rejected(message) => {
                self.on_rejected(&item, message, report);
                Step::Done
            }
            ApplyOutcome::Conflict(server) => self.on_conflict(&item, server, report),
        }
    }

    /// Schedules a write that conflicted again on its immediate re-attempt.
    ///
    /// The retry budget is left alone; only transient failures spend it.
    fn defer_reapply(&self, id: &str, report: &mut DrainReport) {
        let delay = self.backoff.delay(1);
        let at = offset(self.clock.now(), delay);
        if self
            .queue
            .modify(id, |m| {
                if m.status == MutationStatus::Pending {
                    m.next_attempt_at = Some(at);
                }
            })
            .is_ok()
        {
            report.retries.push((id.to_string(), delay));
            debug!(
                %id,
                delay_ms = delay.as_millis() as u64,
                "resolved write deferred after repeated conflict"
            );
        }
    }

    fn on_success(&self, item: &QueuedMutation, report: &mut DrainReport) {
        let now = self.clock.now();
        // Removed below, unless discarded meanwhile.
        let _ = self.queue.update_status(&item.id, MutationStatus::Success, None);
        self.queue
            .record(&SyncLogRecord::for_item(item, SyncOutcome::Success, now, None));
        if let Some(cache) = &self.cache {
            cache.invalidate(Some(item.collection.as_str()));
        }
        let _ = self.queue.remove(&item.id);
        report.succeeded += 1;
        debug!(id = %item.id, collection = %item.collection, "mutation applied");
    }

    fn on_failure(&self, item: &QueuedMutation, message: String, report: &mut DrainReport) {
        let now = self.clock.now();
        let retry_count = (item.retry_count + 1).min(item.max_retries);
        let delay = self.backoff.delay(retry_count);
        let exhausted = retry_count >= item.max_retries;
        let updated = self.queue.modify(&item.id, |m| {
            m.retry_count = retry_count;
            m.last_error = Some(message.clone());
            if exhausted {
                m.status = MutationStatus::Failed;
                m.next_attempt_at = None;
            } else {
                m.status = MutationStatus::Pending;
                m.next_attempt_at = Some(offset(now, delay));
            }
        });
        if updated.is_err() {
            return;
        }
        self.queue.record(&SyncLogRecord::for_item(
            item,
            SyncOutcome::Failed,
            now,
            Some(message.clone()),
        ));

        if exhausted {
            report.failed += 1;
            warn!(
                id = %item.id,
                attempts = retry_count,
                error = %message,
                "mutation failed permanently"
            );
        } else {
            report.retries.push((item.id.clone(), delay));
            debug!(
                id = %item.id,
                attempt = retry_count,
                delay_ms = delay.as_millis() as u64,
                error = %message,
                "mutation rescheduled"
            );
        }
    }

    fn on_rejected(&self, item: &QueuedMutation, message: String, report: &mut DrainReport) {
        let now = self.clock.now();
        if self
            .queue
            .modify(&item.id, |m| {
                m.status = MutationStatus::Failed;
                m.next_attempt_at = None;
                m.last_error = Some(message.clone());
            })
            .is_err()
        {
            return;
        }
        self.queue.record(&SyncLogRecord::for_item(
            item,
            SyncOutcome::Failed,
            now,
            Some(message.clone()),
        ));
        report.failed += 1;
        warn!(id = %item.id, error = %message, "mutation rejected by server");
    }

    fn on_conflict(
        &self,
        item: &QueuedMutation,
        server: ServerRecord,
        report: &mut DrainReport,
    ) -> Step {
        let now = self.clock.now();
        report.conflicts += 1;
        self.queue.record(&SyncLogRecord::for_item(
            item,
            SyncOutcome::Conflict,
            now,
            None,
        ));

        // The server flagged it, but its copy is not newer than ours.
        let strategy = if detect_conflict(item, Some(&server)) {
            self.policy.strategy_for(item.collection)
        } else {
            ConflictStrategy::LocalWins
        };
        info!(id = %item.id, %strategy, server_id = %server.id, "conflict detected");

        match resolve(item, &server, strategy) {
            Resolution::Reapply(record) => {
                let modified = server.last_modified;
                match self
                    .queue
                    .modify(&item.id, |m| requeue_resolved(m, record, modified, now))
                {
                    Ok(_) => Step::Reapply,
                    Err(_) => Step::Done,
                }
            }
            Resolution::Discard(_) => {
                if self.queue.remove(&item.id).is_ok() {
                    report.discarded += 1;
                }
                if let Some(cache) = &self.cache {
                    cache.invalidate(Some(item.collection.as_str()));
                }
                Step::Done
            }
            Resolution::ManualRequired { server, .. } => {
                let message = format!(
                    "conflict: server modified {} at {}",
                    server.id,
                    server.last_modified.to_rfc3339()
                );
                if self
                    .queue
                    .modify(&item.id, |m| {
                        m.status = MutationStatus::Failed;
                        m.next_attempt_at = None;
                        m.last_error = Some(message);
                        m.conflict_snapshot = Some(server);
                    })
                    .is_ok()
                {
                    report.failed += 1;
                }
                Step::Done
            }
        }
    }
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
