// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Online/offline tracking and the sync trigger.
//!
//! The host application reports network transitions through
//! [`Connectivity::set_online`]. [`ConnectivityMonitor`] watches those
//! transitions in a background task and fires the [`SyncTrigger`] once for
//! every offline-to-online edge.

use std::sync::Arc;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Shared online/offline flag.
#[derive(Debug, Clone)]
pub struct Connectivity {
    tx: Arc<watch::Sender<bool>>,
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Connectivity { tx: Arc::new(tx) }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Records the current network state. Returns true if it changed.
    pub fn set_online(&self, online: bool) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            *current = online;
            true
        })
    }

    /// A receiver that observes every change.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Connectivity::new(false)
    }
}

/// Wakes the sync worker.
///
/// Triggers coalesce: firing several times before the worker wakes still
/// produces a single pass.
#[derive(Debug, Clone, Default)]
pub struct SyncTrigger {
    notify: Arc<Notify>,
}

impl SyncTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self) {
        self.notify.notify_one();
    }

    /// Completes once the trigger has been fired.
    pub async fn fired(&self) {
        self.notify.notified().await;
    }
}

/// Background task turning reconnections into sync passes.
pub struct ConnectivityMonitor;

impl ConnectivityMonitor {
    /// Spawns the watcher on the current tokio runtime.
    pub fn spawn(
        connectivity: &Connectivity,
        trigger: SyncTrigger,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let mut rx = connectivity.subscribe();
        let online = *rx.borrow_and_update();
        tokio::spawn(watch_transitions(rx, online, trigger, cancel))
    }
}

async fn watch_transitions(
    mut rx: watch::Receiver<bool>,
    mut online: bool,
    trigger: SyncTrigger,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let now = *rx.borrow_and_update();
                match (online, now) {
                    (false, true) => {
                        info!("connectivity restored, scheduling sync");
                        trigger.fire();
                    }
                    (true, false) => info!("connectivity lost, queueing writes locally"),
                    _ => {}
                }
                online = now;
            }
        }
    }
    debug!("connectivity monitor stopped");
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
