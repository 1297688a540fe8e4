// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.
//!
//! Configuration lives in `<state_dir>/config.toml`. Every key is optional:
//!
//! ```toml
//! max_retries = 3
//! base_delay_ms = 1000
//! max_delay_ms = 30000
//! default_priority = 0
//! conflict_strategy = "manual"
//! cache_ttl_secs = 300
//! cache_max_entries = 500
//! database_file = "gurusync.db"
//! fallback_dir = "fallback"
//!
//! [conflict_overrides]
//! attendance = "server_wins"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gs_core::{Collection, ConflictStrategy};

use crate::backoff::Backoff;
use crate::error::{Error, Result};

const CONFIG_FILE_NAME: &str = "config.toml";
const STATE_DIR_NAME: &str = "gurusync";

/// Environment variable overriding the default state directory.
pub const STATE_DIR_ENV: &str = "GURUSYNC_STATE_DIR";

/// Tunables for the queue, processor and read cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Attempts before a transiently failing item is parked as failed.
    pub max_retries: u32,
    /// First retry delay in milliseconds.
    pub base_delay_ms: u64,
    /// Retry delay ceiling in milliseconds.
    pub max_delay_ms: u64,
    /// Priority given to enqueued items that don't name one.
    pub default_priority: i32,
    pub conflict_strategy: ConflictStrategy,
    pub cache_ttl_secs: u64,
    pub cache_max_entries: usize,
    /// SQLite file, relative to the state directory.
    pub database_file: String,
    /// Flat-list fallback directory, relative to the state directory.
    pub fallback_dir: String,
    /// Per-collection strategy, keyed by collection name.
    pub conflict_overrides: BTreeMap<String, ConflictStrategy>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            default_priority: 0,
            conflict_strategy: ConflictStrategy::Manual,
            cache_ttl_secs: 300,
            cache_max_entries: 500,
            database_file: "gurusync.db".to_string(),
            fallback_dir: "fallback".to_string(),
            conflict_overrides: BTreeMap::new(),
        }
    }
}

impl SyncConfig {
    /// Loads `config.toml` from `state_dir`, or defaults if it doesn't exist.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let config_path = state_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Ok(SyncConfig::default());
        }
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: SyncConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration to `state_dir/config.toml`.
    pub fn save(&self, state_dir: &Path) -> Result<()> {
        fs::create_dir_all(state_dir)?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(state_dir.join(CONFIG_FILE_NAME), content)?;
        Ok(())
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(Error::Config("max_retries must be at least 1".to_string()));
        }
        if self.base_delay_ms > self.max_delay_ms {
            return Err(Error::Config(format!(
                "base_delay_ms ({}) exceeds max_delay_ms ({})",
                self.base_delay_ms, self.max_delay_ms
            )));
        }
        if self.cache_max_entries == 0 {
            return Err(Error::Config(
                "cache_max_entries must be at least 1".to_string(),
            ));
        }
        self.conflict_policy().map(|_| ())
    }

    /// The retry schedule described by the delay settings.
    pub fn backoff(&self) -> Backoff {
        Backoff::new(
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }

    /// Default lifetime of read cache entries.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Resolves the strategy table, rejecting unknown collection names.
    pub fn conflict_policy(&self) -> Result<ConflictPolicy> {
        let mut overrides = HashMap::new();
        for (name, strategy) in &self.conflict_overrides {
            let collection: Collection = name
                .parse()
                .map_err(|e| Error::Config(format!("conflict_overrides: {e}")))?;
            overrides.insert(collection, *strategy);
        }
        Ok(ConflictPolicy {
            default: self.conflict_strategy,
            overrides,
        })
    }
}

/// Which conflict strategy applies to which collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictPolicy {
    pub default: ConflictStrategy,
    pub overrides: HashMap<Collection, ConflictStrategy>,
}

impl ConflictPolicy {
    /// A policy applying `strategy` everywhere.
    pub fn uniform(strategy: ConflictStrategy) -> Self {
        ConflictPolicy {
            default: strategy,
            overrides: HashMap::new(),
        }
    }

    pub fn strategy_for(&self, collection: Collection) -> ConflictStrategy {
        self.overrides
            .get(&collection)
            .copied()
            .unwrap_or(self.default)
    }
}

/// Picks the state directory: `explicit`, then `$GURUSYNC_STATE_DIR`, then
/// the platform's local data directory.
pub fn resolve_state_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = std::env::var_os(STATE_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_local_dir()
        .map(|d| d.join(STATE_DIR_NAME))
        .ok_or_else(|| {
            Error::Config(format!(
                "no local data directory on this platform\n  hint: set {STATE_DIR_ENV} or pass --state-dir"
            ))
        })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
