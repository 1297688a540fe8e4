// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The queue coordinator.
//!
//! [`MutationQueue`] owns the in-memory view of the queue and is the only
//! path through which the persisted queue is read, modified and written back.
//! Every change is:
//!
//! 1. applied to the in-memory list under a single lock
//! 2. persisted through the [`StoreHandle`] (failures are logged, never raised)
//! 3. announced to subscribers with a fresh snapshot, after the lock is released
//!
//! The list is kept in service order: descending priority, then enqueue order.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use gs_core::{
    generate_mutation_id, resolve, validate, ClockSource, Collection, ConflictStrategy,
    MutationId, MutationStatus, OperationKind, Payload, QueuedMutation, Resolution,
    SyncLogRecord,
};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::SyncConfig;
use crate::connectivity::{Connectivity, SyncTrigger};
use crate::error::{Error, Result};
use crate::store::{StoreHandle, StoreKind};

/// Settings applied to newly enqueued mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueOptions {
    pub default_priority: i32,
    pub max_retries: u32,
    /// Mixed into mutation ids so two devices never mint the same one.
    pub nonce: String,
}

impl QueueOptions {
    pub fn from_config(config: &SyncConfig) -> Self {
        QueueOptions {
            default_priority: config.default_priority,
            max_retries: config.max_retries,
            ..Self::default()
        }
    }
}

impl Default for QueueOptions {
    fn default() -> Self {
        QueueOptions {
            default_priority: 0,
            max_retries: 3,
            nonce: format!("gurusync-{}", std::process::id()),
        }
    }
}

/// Counts by state, for status displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub pending: usize,
    pub processing: usize,
    /// Failed items, conflicted ones included.
    pub failed: usize,
    /// Failed items waiting on a manual conflict decision.
    pub conflicted: usize,
    /// Capture time of the oldest pending write.
    pub oldest_pending: Option<DateTime<Utc>>,
}

impl QueueStats {
    pub fn total(&self) -> usize {
        self.pending + self.processing + self.failed
    }
}

type Listener = Arc<dyn Fn(&[QueuedMutation]) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    entries: Vec<(u64, Listener)>,
}

/// Keeps a queue listener registered. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Stops further notifications.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock(&listeners).entries.retain(|(id, _)| *id != self.id);
        }
    }
}

struct QueueState {
    items: Vec<QueuedMutation>,
    next_sequence: u64,
}

impl QueueState {
    fn position(&self, id: &str) -> Result<usize> {
        self.items
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| Error::MutationNotFound(id.to_string()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Puts a conflict-resolved item back in line with `record` as its payload.
///
/// The capture time moves past the server's modification time so the
/// resolved write is not itself seen as stale on its next attempt.
pub(crate) fn requeue_resolved(
    item: &mut QueuedMutation,
    record: Payload,
    server_modified: DateTime<Utc>,
    now: DateTime<Utc>,
) {
    let past_server = server_modified
        .checked_add_signed(chrono::Duration::milliseconds(1))
        .unwrap_or(server_modified);
    item.payload = record;
    item.local_timestamp = now.max(past_server);
    // The record exists on the server now.
    if item.operation == OperationKind::Create {
        item.operation = OperationKind::Upsert;
    }
    item.status = MutationStatus::Pending;
    item.next_attempt_at = None;
    item.last_error = None;
    item.conflict_snapshot = None;
}

/// The offline mutation queue.
pub struct MutationQueue {
    store: StoreHandle,
    clock: Arc<dyn ClockSource>,
    options: QueueOptions,
    state: Mutex<QueueState>,
    listeners: Arc<Mutex<Listeners>>,
    next_listener: AtomicU64,
    autosync: Option<(Connectivity, SyncTrigger)>,
}

impl MutationQueue {
    /// Loads the persisted queue from `store`.
    ///
    /// Items left `Processing` by a crash go back to `Pending` without
    /// spending retry budget; items left `Success` are dropped.
    pub fn open(
        store: StoreHandle,
        clock: Arc<dyn ClockSource>,
        options: QueueOptions,
    ) -> Result<Self> {
        let loaded = store.load_queue()?;
        let loaded_len = loaded.len();

        let mut recovered = 0;
        let mut items: Vec<QueuedMutation> = loaded
            .into_iter()
            .filter(|m| m.status != MutationStatus::Success)
            .map(|mut m| {
                if m.status == MutationStatus::Processing {
                    m.status = MutationStatus::Pending;
                    recovered += 1;
                }
                m
            })
            .collect();
        items.sort_by(|a, b| a.queue_order(b));
        let next_sequence = items.iter().map(|m| m.sequence).max().unwrap_or(0) + 1;

        let queue = MutationQueue {
            store,
            clock,
            options,
            state: Mutex::new(QueueState {
                items,
                next_sequence,
            }),
            listeners: Arc::new(Mutex::new(Listeners::default())),
            next_listener: AtomicU64::new(1),
            autosync: None,
        };

        let state = lock(&queue.state);
        if recovered > 0 || state.items.len() != loaded_len {
            info!(
                recovered,
                dropped = loaded_len - state.items.len(),
                "recovered queue after unclean shutdown"
            );
            queue.persist(&state.items);
        }
        debug!(
            items = state.items.len(),
            store = %queue.store.kind(),
            "queue loaded"
        );
        drop(state);
        Ok(queue)
    }

    /// Fires `trigger` on enqueue whenever `connectivity` reports online.
    pub fn with_autosync(mut self, connectivity: Connectivity, trigger: SyncTrigger) -> Self {
        self.autosync = Some((connectivity, trigger));
        self
    }

    pub fn store_kind(&self) -> StoreKind {
        self.store.kind()
    }

    /// Validates and queues a write, returning its id.
    ///
    /// Only local work happens here: invalid payloads are rejected before
    /// anything is queued, and the remote is never contacted.
    pub fn enqueue(
        &self,
        operation: OperationKind,
        collection: Collection,
        payload: Value,
        priority: Option<i32>,
    ) -> Result<MutationId> {
        let payload = validate(collection, operation, payload)?;
        let captured_at = self.clock.now();
        let priority = priority.unwrap_or(self.options.default_priority);

        let id = self.mutate(|state| {
            let sequence = state.next_sequence;
            state.next_sequence += 1;
            let id = generate_mutation_id(&self.options.nonce, &captured_at, sequence);
            let item = QueuedMutation::new(
                id.clone(),
                sequence,
                operation,
                collection,
                payload,
                priority,
                self.options.max_retries,
                captured_at,
            );
            let at = state
                .items
                .partition_point(|m| m.queue_order(&item) == Ordering::Less);
            state.items.insert(at, item);
            id
        });
        debug!(%id, %operation, %collection, priority, "mutation queued");

        if let Some((connectivity, trigger)) = &self.autosync {
            if connectivity.is_online() {
                trigger.fire();
            }
        }
        Ok(id)
    }

    /// Discards an item, whatever its state.
    pub fn remove(&self, id: &str) -> Result<QueuedMutation> {
        let removed = self.try_mutate(|state| {
            let index = state.position(id)?;
            Ok(state.items.remove(index))
        })?;
        debug!(%id, status = %removed.status, "mutation removed");
        Ok(removed)
    }

    /// Sets an item's status, recording `error` when given.
    pub fn update_status(
        &self,
        id: &str,
        status: MutationStatus,
        error: Option<String>,
    ) -> Result<()> {
        self.modify(id, |item| {
            item.status = status;
            if error.is_some() {
                item.last_error = error;
            }
        })
        .map(|_| ())
    }

    pub fn get(&self, id: &str) -> Option<QueuedMutation> {
        lock(&self.state).items.iter().find(|m| m.id == id).cloned()
    }

    /// Snapshot of the whole queue in service order.
    pub fn get_queue(&self) -> Vec<QueuedMutation> {
        lock(&self.state).items.clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).items.len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.state).items.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.state)
            .items
            .iter()
            .filter(|m| m.status == MutationStatus::Pending)
            .count()
    }

    pub fn failed_items(&self) -> Vec<QueuedMutation> {
        lock(&self.state)
            .items
            .iter()
            .filter(|m| m.status == MutationStatus::Failed)
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> QueueStats {
        let state = lock(&self.state);
        let mut stats = QueueStats::default();
        for item in &state.items {
            match item.status {
                MutationStatus::Pending => {
                    stats.pending += 1;
                    stats.oldest_pending = Some(match stats.oldest_pending {
                        Some(t) => t.min(item.local_timestamp),
                        None => item.local_timestamp,
                    });
                }
                MutationStatus::Processing => stats.processing += 1,
                MutationStatus::Failed => {
                    stats.failed += 1;
                    if item.has_conflict() {
                        stats.conflicted += 1;
                    }
                }
                MutationStatus::Success => {}
            }
        }
        stats
    }

    /// Drops every item that is not being applied right now.
    pub fn clear(&self) -> usize {
        let removed = self.mutate(|state| {
            let before = state.items.len();
            state
                .items
                .retain(|m| m.status == MutationStatus::Processing);
            before - state.items.len()
        });
        info!(removed, "queue cleared");
        removed
    }

    pub fn clear_failed(&self) -> usize {
        let removed = self.mutate(|state| {
            let before = state.items.len();
            state.items.retain(|m| m.status != MutationStatus::Failed);
            before - state.items.len()
        });
        info!(removed, "failed mutations cleared");
        removed
    }

    /// Gives every failed item a fresh retry budget and asks for a pass.
    ///
    /// Parked conflicts are included; their server snapshot is dropped and
    /// they are sent again as they are.
    pub fn retry_failed(&self) -> usize {
        let reset = self.mutate(|state| {
            let mut reset = 0;
            for item in state
                .items
                .iter_mut()
                .filter(|m| m.status == MutationStatus::Failed)
            {
                item.reset_for_retry();
                reset += 1;
            }
            reset
        });
        info!(reset, "failed mutations requeued");
        if reset > 0 {
            if let Some((_, trigger)) = &self.autosync {
                trigger.fire();
            }
        }
        reset
    }

    /// Settles a parked conflict with `strategy`.
    ///
    /// `local_wins` and `merge` put the item back in line with the resolved
    /// payload; `server_wins` drops it. `manual` is refused.
    pub fn resolve_conflict(&self, id: &str, strategy: ConflictStrategy) -> Result<Resolution> {
        if strategy == ConflictStrategy::Manual {
            return Err(gs_core::Error::InvalidStrategy(strategy.to_string()).into());
        }
        let now = self.clock.now();
        let resolution = self.try_mutate(|state| {
            let index = state.position(id)?;
            let item = &state.items[index];
            let server = match (&item.conflict_snapshot, item.status) {
                (Some(server), MutationStatus::Failed) => server.clone(),
                _ => return Err(Error::NoConflict(id.to_string())),
            };
            let resolution = resolve(item, &server, strategy);
            match &resolution {
                Resolution::Reapply(record) => {
                    requeue_resolved(
                        &mut state.items[index],
                        record.clone(),
                        server.last_modified,
                        now,
                    );
                }
                Resolution::Discard(_) => {
                    state.items.remove(index);
                }
                Resolution::ManualRequired { .. } => {}
            }
            Ok(resolution)
        })?;
        info!(%id, %strategy, "conflict resolved");

        if let (Resolution::Reapply(_), Some((connectivity, trigger))) = (&resolution, &self.autosync)
        {
            if connectivity.is_online() {
                trigger.fire();
            }
        }
        Ok(resolution)
    }

    /// Registers `listener` and calls it at once with the current queue.
    ///
    /// The listener runs again after every persisted change, on the thread
    /// that made it, with no queue lock held.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&[QueuedMutation]) + Send + Sync + 'static,
    {
        let id = self.next_listener.fetch_add(1, AtomicOrdering::Relaxed);
        let listener: Listener = Arc::new(listener);
        let snapshot = {
            let state = lock(&self.state);
            lock(&self.listeners)
                .entries
                .push((id, Arc::clone(&listener)));
            state.items.clone()
        };
        listener(&snapshot);
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).entries.len()
    }

    /// Most recent sync log records, newest first.
    pub fn read_log(&self, limit: usize) -> Result<Vec<SyncLogRecord>> {
        self.store.read_log(limit)
    }

    pub fn clear_log(&self) -> Result<()> {
        self.store.clear_log()
    }

    /// Time until the earliest scheduled retry, if any is scheduled.
    pub fn next_wakeup(&self, now: DateTime<Utc>) -> Option<Duration> {
        lock(&self.state)
            .items
            .iter()
            .filter(|m| m.status == MutationStatus::Pending)
            .filter_map(|m| m.next_attempt_at)
            .min()
            .map(|at| (at - now).to_std().unwrap_or(Duration::ZERO))
    }

    /// The first item ready at `now` that is not in `skip`.
    pub(crate) fn next_ready(
        &self,
        now: DateTime<Utc>,
        skip: &HashSet<MutationId>,
    ) -> Option<QueuedMutation> {
        lock(&self.state)
            .items
            .iter()
            .find(|m| m.is_ready(now) && !skip.contains(&m.id))
            .cloned()
    }

    pub(crate) fn ready_count(&self, now: DateTime<Utc>, skip: &HashSet<MutationId>) -> usize {
        lock(&self.state)
            .items
            .iter()
            .filter(|m| m.is_ready(now) && !skip.contains(&m.id))
            .count()
    }

    /// Applies `f` to one item and persists the result.
    pub(crate) fn modify(
        &self,
        id: &str,
        f: impl FnOnce(&mut QueuedMutation),
    ) -> Result<QueuedMutation> {
        self.try_mutate(|state| {
            let index = state.position(id)?;
            let item = &mut state.items[index];
            f(item);
            Ok(item.clone())
        })
    }

    /// Removes items that finished successfully.
    pub(crate) fn prune_succeeded(&self) -> usize {
        let mut state = lock(&self.state);
        let before = state.items.len();
        state
            .items
            .retain(|m| m.status != MutationStatus::Success);
        let pruned = before - state.items.len();
        if pruned > 0 {
            self.commit(state);
        }
        pruned
    }

    /// Appends to the sync log; failures are logged and swallowed.
    pub(crate) fn record(&self, entry: &SyncLogRecord) {
        if let Err(e) = self.store.append_log(entry) {
            error!(error = %e, item = %entry.item_id, "failed to append sync log");
        }
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut QueueState) -> T) -> T {
        let mut state = lock(&self.state);
        let value = f(&mut state);
        self.commit(state);
        value
    }

    fn try_mutate<T>(&self, f: impl FnOnce(&mut QueueState) -> Result<T>) -> Result<T> {
        let mut state = lock(&self.state);
        let value = f(&mut state)?;
        self.commit(state);
        Ok(value)
    }

    fn commit(&self, state: MutexGuard<'_, QueueState>) {
        self.persist(&state.items);
        let snapshot = state.items.clone();
        drop(state);
        self.notify(&snapshot);
    }

    fn persist(&self, items: &[QueuedMutation]) {
        if let Err(e) = self.store.save_queue(items) {
            error!(
                error = %e,
                store = %self.store.kind(),
                items = items.len(),
                "failed to persist queue"
            );
        }
    }

    fn notify(&self, snapshot: &[QueuedMutation]) {
        let listeners: Vec<Listener> = lock(&self.listeners)
            .entries
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
