// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Time-boxed cache of remote reads.
//!
//! The cache is passive: it never fetches anything. The data-access layer
//! around the engine stores what it read with [`ReadCache::put`] and consults
//! [`ReadCache::get`] before going to the network, or instead of it while
//! offline. Entries are written through to the store so they survive a
//! restart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use gs_core::{offset, CacheEntry, ClockSource};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::store::StoreHandle;

/// Read cache with per-entry expiry and a size bound.
pub struct ReadCache {
    store: StoreHandle,
    clock: Arc<dyn ClockSource>,
    default_ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ReadCache {
    /// Loads persisted entries from `store`, dropping any already expired.
    pub fn open(
        store: StoreHandle,
        clock: Arc<dyn ClockSource>,
        default_ttl: Duration,
        max_entries: usize,
    ) -> Self {
        let loaded = store.load_cache().unwrap_or_else(|e| {
            warn!(error = %e, "could not load read cache, starting empty");
            Vec::new()
        });
        let cache = ReadCache {
            store,
            clock,
            default_ttl,
            max_entries: max_entries.max(1),
            entries: Mutex::new(
                loaded
                    .into_iter()
                    .map(|entry| (entry.key.clone(), entry))
                    .collect(),
            ),
        };
        cache.purge_expired();
        cache
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Stores `value` under `key`, expiring after `ttl` (or the default).
    pub fn put(
        &self,
        key: impl Into<String>,
        collection: impl Into<String>,
        value: Value,
        ttl: Option<Duration>,
    ) {
        let now = self.clock.now();
        let entry = CacheEntry {
            key: key.into(),
            collection: collection.into(),
            value,
            cached_at: now,
            expires_at: offset(now, ttl.unwrap_or(self.default_ttl)),
        };

        // Store writes happen under the entries lock so disk and memory agree.
        let mut entries = self.entries();
        if let Err(e) = self.store.put_cache(&entry) {
            error!(error = %e, key = %entry.key, "failed to persist cache entry");
        }
        entries.insert(entry.key.clone(), entry);
        let evicted = evict_oldest(&mut entries, self.max_entries);
        if !evicted.is_empty() {
            debug!(count = evicted.len(), "evicted oldest cache entries");
            self.forget(&evicted);
        }
    }

    /// The cached value for `key`, unless absent or expired.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        let mut entries = self.entries();
        match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                self.forget(&[key.to_string()]);
                None
            }
            None => None,
        }
    }

    /// Drops entries of `collection`, or everything when `None`.
    pub fn invalidate(&self, collection: Option<&str>) -> usize {
        match collection {
            None => {
                let mut entries = self.entries();
                let removed = entries.len();
                entries.clear();
                if let Err(e) = self.store.clear_cache() {
                    error!(error = %e, "failed to clear persisted cache");
                }
                removed
            }
            Some(collection) => {
                let mut entries = self.entries();
                let keys: Vec<String> = entries
                    .values()
                    .filter(|e| e.collection == collection)
                    .map(|e| e.key.clone())
                    .collect();
                for key in &keys {
                    entries.remove(key);
                }
                if !keys.is_empty() {
                    self.forget(&keys);
                }
                keys.len()
            }
        }
    }

    /// Removes every expired entry.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries();
        let expired: Vec<String> = entries
            .values()
            .filter(|e| e.is_expired(now))
            .map(|e| e.key.clone())
            .collect();
        for key in &expired {
            entries.remove(key);
        }
        if !expired.is_empty() {
            debug!(count = expired.len(), "purged expired cache entries");
            self.forget(&expired);
        }
        expired.len()
    }

    /// Number of entries held, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn forget(&self, keys: &[String]) {
        if let Err(e) = self.store.remove_cache(keys) {
            error!(error = %e, count = keys.len(), "failed to remove persisted cache entries");
        }
    }
}

/// Removes the oldest entries until at most `max` remain.
fn evict_oldest(entries: &mut HashMap<String, CacheEntry>, max: usize) -> Vec<String> {
    if entries.len() <= max {
        return Vec::new();
    }
    let mut by_age: Vec<(chrono::DateTime<chrono::Utc>, String)> = entries
        .values()
        .map(|e| (e.cached_at, e.key.clone()))
        .collect();
    by_age.sort();
    let excess = entries.len() - max;
    by_age
        .into_iter()
        .take(excess)
        .map(|(_, key)| {
            entries.remove(&key);
            key
        })
        .collect()
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
