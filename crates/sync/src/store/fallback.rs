// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Flat-list store made of JSON-lines files.
//!
//! Layout under the fallback directory:
//!
//! - `queue.jsonl`: the whole queue, rewritten on every save
//! - `cache.jsonl`: cache entries, rewritten on every change
//! - `sync_log.jsonl`: appended to, oldest first
//!
//! Rewrites replace the file atomically, but there is no transaction across
//! files.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use gs_core::{jsonl, CacheEntry, QueuedMutation, SyncLogRecord};

use super::{QueueStore, StoreKind};
use crate::error::Result;

const QUEUE_FILE: &str = "queue.jsonl";
const CACHE_FILE: &str = "cache.jsonl";
const LOG_FILE: &str = "sync_log.jsonl";

/// Store that keeps each region in its own JSONL file.
pub struct FallbackStore {
    dir: PathBuf,
    io: Mutex<()>,
}

impl FallbackStore {
    /// Opens the store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(FallbackStore {
            dir: dir.to_path_buf(),
            io: Mutex::new(()),
        })
    }

    /// True if `dir` holds a queue file with at least one byte in it.
    pub fn has_queue(dir: &Path) -> bool {
        std::fs::metadata(dir.join(QUEUE_FILE)).is_ok_and(|m| m.len() > 0)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.io.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn rewrite_cache(&self, f: impl FnOnce(&mut Vec<CacheEntry>)) -> Result<()> {
        let _io = self.lock();
        let path = self.path(CACHE_FILE);
        let mut entries: Vec<CacheEntry> = jsonl::read_all(&path)?;
        f(&mut entries);
        jsonl::write_all(&path, &entries)?;
        Ok(())
    }
}

impl QueueStore for FallbackStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Fallback
    }

    fn load_queue(&self) -> Result<Vec<QueuedMutation>> {
        let _io = self.lock();
        Ok(jsonl::read_all(&self.path(QUEUE_FILE))?)
    }

    fn save_queue(&self, items: &[QueuedMutation]) -> Result<()> {
        let _io = self.lock();
        jsonl::write_all(&self.path(QUEUE_FILE), items)?;
        Ok(())
    }

    fn load_cache(&self) -> Result<Vec<CacheEntry>> {
        let _io = self.lock();
        Ok(jsonl::read_all(&self.path(CACHE_FILE))?)
    }

    fn put_cache(&self, entry: &CacheEntry) -> Result<()> {
        self.rewrite_cache(|entries| {
            entries.retain(|e| e.key != entry.key);
            entries.push(entry.clone());
        })
    }

    fn remove_cache(&self, keys: &[String]) -> Result<()> {
        self.rewrite_cache(|entries| entries.retain(|e| !keys.contains(&e.key)))
    }

    fn clear_cache(&self) -> Result<()> {
        self.rewrite_cache(Vec::clear)
    }

    fn append_log(&self, record: &SyncLogRecord) -> Result<()> {
        let _io = self.lock();
        jsonl::append(&self.path(LOG_FILE), record)?;
        Ok(())
    }

    fn read_log(&self, limit: usize) -> Result<Vec<SyncLogRecord>> {
        let _io = self.lock();
        let records: Vec<SyncLogRecord> = jsonl::read_all(&self.path(LOG_FILE))?;
        Ok(records.into_iter().rev().take(limit).collect())
    }

    fn clear_log(&self) -> Result<()> {
        let _io = self.lock();
        jsonl::write_all::<SyncLogRecord>(&self.path(LOG_FILE), &[])?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "fallback_tests.rs"]
mod tests;
