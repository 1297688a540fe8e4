// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! gs-sync: Offline mutation queue and replay engine.
//!
//! Writes are captured by the [`MutationQueue`], persisted through a
//! [`StoreHandle`], and replayed against a [`RemoteApply`] implementation by
//! the [`SyncProcessor`] whenever the [`Connectivity`] flag reports the
//! device online. [`SyncEngine`] wires the pieces together.

pub mod backoff;
pub mod cache;
pub mod config;
pub mod connectivity;
pub mod engine;
pub mod error;
pub mod lock;
pub mod processor;
pub mod queue;
pub mod remote;
pub mod store;

#[cfg(test)]
mod test_helpers;

pub use backoff::Backoff;
pub use cache::ReadCache;
pub use config::{resolve_state_dir, ConflictPolicy, SyncConfig};
pub use connectivity::{Connectivity, ConnectivityMonitor, SyncTrigger};
pub use engine::SyncEngine;
pub use error::{Error, Result};
pub use lock::StateLock;
pub use processor::{DrainReport, ProgressState, SyncProcessor, SyncProgress};
pub use queue::{MutationQueue, QueueOptions, QueueStats, Subscription};
pub use remote::{ApplyOutcome, RemoteApply};
pub use store::{probe, QueueStore, StoreHandle, StoreKind};
