// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the sync engine.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the sync engine and its stores.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] gs_core::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage unavailable: {0}")]
    Storage(String),

    #[error("mutation not found: {0}")]
    MutationNotFound(String),

    #[error("mutation {0} has no conflict to resolve\n  hint: only failed items with a server snapshot can be resolved")]
    NoConflict(String),

    #[error("state directory {} is in use by another process", .0.display())]
    Locked(PathBuf),
}

impl Error {
    /// Returns true if the error rejected caller input before anything was queued.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Core(e) if e.is_validation())
    }
}

/// Result alias for sync engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
