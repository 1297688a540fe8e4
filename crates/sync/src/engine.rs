// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The assembled sync engine.
//!
//! [`SyncEngine`] owns one queue, one read cache and one processor over a
//! single store, plus the background worker that runs passes. The worker
//! wakes on three things: the [`SyncTrigger`] (reconnection, enqueue while
//! online, explicit retry), the earliest scheduled retry, and shutdown.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use gs_core::{ClockSource, SystemClock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::ReadCache;
use crate::config::SyncConfig;
use crate::connectivity::{Connectivity, ConnectivityMonitor, SyncTrigger};
use crate::error::Result;
use crate::lock::StateLock;
use crate::processor::{DrainReport, ProgressState, SyncProcessor};
use crate::queue::{MutationQueue, QueueOptions};
use crate::remote::RemoteApply;
use crate::store::{self, StoreHandle};

pub struct SyncEngine {
    config: SyncConfig,
    queue: Arc<MutationQueue>,
    cache: Arc<ReadCache>,
    processor: Arc<SyncProcessor>,
    connectivity: Connectivity,
    trigger: SyncTrigger,
    clock: Arc<dyn ClockSource>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
    _lock: Option<StateLock>,
}

impl SyncEngine {
    /// Opens the engine over `state_dir`, taking the directory lock.
    ///
    /// Starts offline; report connectivity with [`SyncEngine::set_online`].
    pub fn open(state_dir: &Path, remote: Arc<dyn RemoteApply>) -> Result<Self> {
        let config = SyncConfig::load(state_dir)?;
        let lock = StateLock::acquire(state_dir)?;
        let store = store::probe(state_dir, &config);
        info!(
            state_dir = %state_dir.display(),
            store = %store.kind(),
            "sync engine opened"
        );
        let mut engine = Self::with_store(store, config, remote, Arc::new(SystemClock))?;
        engine._lock = Some(lock);
        Ok(engine)
    }

    /// Builds the engine over an already opened store.
    pub fn with_store(
        store: StoreHandle,
        config: SyncConfig,
        remote: Arc<dyn RemoteApply>,
        clock: Arc<dyn ClockSource>,
    ) -> Result<Self> {
        config.validate()?;
        let connectivity = Connectivity::default();
        let trigger = SyncTrigger::new();

        let queue = Arc::new(
            MutationQueue::open(
                store.clone(),
                clock.clone(),
                QueueOptions::from_config(&config),
            )?
            .with_autosync(connectivity.clone(), trigger.clone()),
        );
        let cache = Arc::new(ReadCache::open(
            store,
            clock.clone(),
            config.cache_ttl(),
            config.cache_max_entries,
        ));
        let processor = Arc::new(
            SyncProcessor::new(
                queue.clone(),
                remote,
                clock.clone(),
                config.backoff(),
                config.conflict_policy()?,
            )
            .with_cache(cache.clone()),
        );

        Ok(SyncEngine {
            config,
            queue,
            cache,
            processor,
            connectivity,
            trigger,
            clock,
            cancel: CancellationToken::new(),
            tasks: Vec::new(),
            _lock: None,
        })
    }

    /// Spawns the connectivity monitor and the sync worker.
    ///
    /// Must be called from within a tokio runtime. Calling it twice is a
    /// no-op.
    pub fn start(&mut self) {
        if !self.tasks.is_empty() {
            return;
        }
        self.tasks.push(ConnectivityMonitor::spawn(
            &self.connectivity,
            self.trigger.clone(),
            self.cancel.clone(),
        ));
        self.tasks.push(tokio::spawn(run_worker(
            self.processor.clone(),
            self.queue.clone(),
            self.connectivity.clone(),
            self.trigger.clone(),
            self.clock.clone(),
            self.cancel.clone(),
        )));
        // Work left from a previous run.
        if self.connectivity.is_online() && !self.queue.is_empty() {
            self.trigger.fire();
        }
        debug!("sync worker started");
    }

    /// Stops the background tasks, letting a running pass finish first.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
        info!("sync engine stopped");
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn queue(&self) -> &Arc<MutationQueue> {
        &self.queue
    }

    pub fn cache(&self) -> &Arc<ReadCache> {
        &self.cache
    }

    pub fn processor(&self) -> &Arc<SyncProcessor> {
        &self.processor
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    /// Reports a network transition. Going online schedules a pass.
    pub fn set_online(&self, online: bool) -> bool {
        self.connectivity.set_online(online)
    }

    /// Runs a pass now on the caller's task, whatever the connectivity flag
    /// says. Returns `None` if a pass is already running.
    pub async fn sync_now(&self) -> Option<DrainReport> {
        self.processor.drain().await
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_worker(
    processor: Arc<SyncProcessor>,
    queue: Arc<MutationQueue>,
    connectivity: Connectivity,
    trigger: SyncTrigger,
    clock: Arc<dyn ClockSource>,
    cancel: CancellationToken,
) {
    loop {
        let wake = if connectivity.is_online() {
            queue.next_wakeup(clock.now())
        } else {
            None
        };
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = trigger.fired() => {}
            _ = sleep_for(wake) => {}
        }
        if !connectivity.is_online() {
            continue;
        }
        if processor.drain().await.is_none() {
            follow_other_pass(&processor, &queue, &trigger, clock.as_ref()).await;
        }
    }
    debug!("sync worker stopped");
}

/// Waits out a pass started elsewhere, then re-arms the trigger if that pass
/// left ready work behind (enqueued after its last pick).
async fn follow_other_pass(
    processor: &SyncProcessor,
    queue: &MutationQueue,
    trigger: &SyncTrigger,
    clock: &dyn ClockSource,
) {
    let mut progress = processor.progress();
    let _ = progress
        .wait_for(|p| p.state != ProgressState::Syncing)
        .await;
    if queue.ready_count(clock.now(), &HashSet::new()) > 0 {
        debug!("work arrived during another pass, re-arming trigger");
        trigger.fire();
    }
}

async fn sleep_for(wake: Option<Duration>) {
    match wake {
        Some(delay) => tokio::time::sleep(delay).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
