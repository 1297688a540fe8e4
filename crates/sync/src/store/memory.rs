// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-process store that never touches disk.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use gs_core::{CacheEntry, QueuedMutation, SyncLogRecord};

use super::{QueueStore, StoreKind};
use crate::error::{Error, Result};

#[derive(Default)]
struct MemoryState {
    queue: Vec<QueuedMutation>,
    cache: BTreeMap<String, CacheEntry>,
    log: Vec<SyncLogRecord>,
}

/// Volatile store. Writes can be made to fail on demand to exercise the
/// degraded-storage paths of its callers.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every write returns [`Error::Storage`] and changes nothing.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Release);
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn writable(&self) -> Result<MutexGuard<'_, MemoryState>> {
        if self.fail_writes.load(Ordering::Acquire) {
            return Err(Error::Storage("memory store rejected write".to_string()));
        }
        Ok(self.state())
    }
}

impl QueueStore for MemoryStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }

    fn load_queue(&self) -> Result<Vec<QueuedMutation>> {
        Ok(self.state().queue.clone())
    }

    fn save_queue(&self, items: &[QueuedMutation]) -> Result<()> {
        self.writable()?.queue = items.to_vec();
        Ok(())
    }

    fn load_cache(&self) -> Result<Vec<CacheEntry>> {
        Ok(self.state().cache.values().cloned().collect())
    }

    fn put_cache(&self, entry: &CacheEntry) -> Result<()> {
        self.writable()?
            .cache
            .insert(entry.key.clone(), entry.clone());
        Ok(())
    }

    fn remove_cache(&self, keys: &[String]) -> Result<()> {
        let mut state = self.writable()?;
        for key in keys {
            state.cache.remove(key);
        }
        Ok(())
    }

    fn clear_cache(&self) -> Result<()> {
        self.writable()?.cache.clear();
        Ok(())
    }

    fn append_log(&self, record: &SyncLogRecord) -> Result<()> {
        self.writable()?.log.push(record.clone());
        Ok(())
    }

    fn read_log(&self, limit: usize) -> Result<Vec<SyncLogRecord>> {
        Ok(self.state().log.iter().rev().take(limit).cloned().collect())
    }

    fn clear_log(&self) -> Result<()> {
        self.writable()?.log.clear();
        Ok(())
    }
}
