// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod cache;
pub mod config;
pub mod enqueue;
pub mod list;
pub mod log;
pub mod queue;
pub mod resolve;
pub mod status;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gs_core::SystemClock;
use gs_sync::{
    probe, resolve_state_dir, MutationQueue, QueueOptions, ReadCache, StateLock, StoreHandle,
    SyncConfig,
};
use serde::Serialize;

use crate::error::{Error, Result};

/// An opened state directory: the queue and cache over the probed store.
///
/// Holds the directory lock, so a running engine and `gsq` never write the
/// same queue at once.
pub struct Workspace {
    pub state_dir: PathBuf,
    pub config: SyncConfig,
    pub queue: MutationQueue,
    pub cache: ReadCache,
    _lock: Option<StateLock>,
}

impl Workspace {
    pub fn open(state_dir: Option<&Path>) -> Result<Self> {
        let state_dir = resolve_state_dir(state_dir)?;
        let config = SyncConfig::load(&state_dir)?;
        let lock = StateLock::acquire(&state_dir)?;
        let store = probe(&state_dir, &config);
        let mut workspace = Self::with_store(state_dir, config, store)?;
        workspace._lock = Some(lock);
        Ok(workspace)
    }

    pub(crate) fn with_store(
        state_dir: PathBuf,
        config: SyncConfig,
        store: StoreHandle,
    ) -> Result<Self> {
        let clock = Arc::new(SystemClock);
        let queue = MutationQueue::open(
            store.clone(),
            clock.clone(),
            QueueOptions::from_config(&config),
        )?;
        let cache = ReadCache::open(store, clock, config.cache_ttl(), config.cache_max_entries);
        Ok(Workspace {
            state_dir,
            config,
            queue,
            cache,
            _lock: None,
        })
    }
}

/// Writes `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(Error::Output)?;
    writeln!(out, "{text}")?;
    Ok(())
}
