// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable queue store.
//!
//! Three logical regions live behind [`QueueStore`]: the queue itself (keyed
//! by mutation id), the read cache (keyed by cache key), and the append-only
//! sync log. Implementations:
//!
//! - [`SqliteStore`]: transactional, the normal choice
//! - [`FallbackStore`]: JSON-lines files, used when SQLite can't be opened
//! - [`MemoryStore`]: nothing touches disk; last resort and test double
//!
//! [`probe`] picks one at startup. Callers only ever see a [`StoreHandle`].

mod fallback;
mod memory;
mod sqlite;

pub use fallback::FallbackStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use gs_core::{CacheEntry, QueuedMutation, SyncLogRecord};
use tracing::{error, info, warn};

use crate::config::SyncConfig;
use crate::error::Result;

/// Which implementation backs a [`StoreHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sqlite,
    Fallback,
    Memory,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Sqlite => "sqlite",
            StoreKind::Fallback => "fallback",
            StoreKind::Memory => "memory",
        }
    }

    /// True if queued writes survive a restart.
    pub fn is_durable(&self) -> bool {
        !matches!(self, StoreKind::Memory)
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Persistence for the queue, the read cache and the sync log.
pub trait QueueStore: Send + Sync {
    fn kind(&self) -> StoreKind;

    /// Every persisted mutation, in no particular order.
    fn load_queue(&self) -> Result<Vec<QueuedMutation>>;

    /// Replaces the persisted queue with `items` as one unit.
    fn save_queue(&self, items: &[QueuedMutation]) -> Result<()>;

    fn load_cache(&self) -> Result<Vec<CacheEntry>>;

    /// Inserts or replaces the entry under `entry.key`.
    fn put_cache(&self, entry: &CacheEntry) -> Result<()>;

    fn remove_cache(&self, keys: &[String]) -> Result<()>;

    fn clear_cache(&self) -> Result<()>;

    fn append_log(&self, record: &SyncLogRecord) -> Result<()>;

    /// Up to `limit` records, newest first.
    fn read_log(&self, limit: usize) -> Result<Vec<SyncLogRecord>>;

    fn clear_log(&self) -> Result<()>;
}

/// Shared handle to the store selected at startup.
pub type StoreHandle = Arc<dyn QueueStore>;

/// Opens the best store available under `state_dir`.
///
/// SQLite is preferred. If it cannot be opened the flat-list fallback is
/// used, and if that fails too, an in-memory store. Degradation is logged and
/// never returned as an error. When SQLite opens and finds its queue empty,
/// items left behind in the fallback directory are imported.
pub fn probe(state_dir: &Path, config: &SyncConfig) -> StoreHandle {
    let db_path = state_dir.join(&config.database_file);
    let fallback_dir = state_dir.join(&config.fallback_dir);

    match SqliteStore::open(&db_path) {
        Ok(store) => {
            adopt_fallback_queue(&store, &fallback_dir);
            Arc::new(store)
        }
        Err(e) => {
            warn!(
                error = %e,
                path = %db_path.display(),
                "durable store unavailable, falling back to flat-list files"
            );
            match FallbackStore::open(&fallback_dir) {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    error!(
                        error = %e,
                        path = %fallback_dir.display(),
                        "fallback store unavailable, queue will not survive a restart"
                    );
                    Arc::new(MemoryStore::new())
                }
            }
        }
    }
}

fn adopt_fallback_queue(store: &SqliteStore, fallback_dir: &Path) {
    if !FallbackStore::has_queue(fallback_dir) {
        return;
    }
    let result = (|| -> Result<usize> {
        if !store.load_queue()?.is_empty() {
            return Ok(0);
        }
        let fallback = FallbackStore::open(fallback_dir)?;
        let items = fallback.load_queue()?;
        store.save_queue(&items)?;
        fallback.save_queue(&[])?;
        Ok(items.len())
    })();
    match result {
        Ok(0) => {}
        Ok(count) => info!(count, "imported queued mutations from fallback store"),
        Err(e) => warn!(error = %e, "could not import fallback queue"),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
