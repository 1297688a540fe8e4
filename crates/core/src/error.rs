// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for gs-core operations.

use thiserror::Error;

/// All possible errors that can occur in gs-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown collection: '{0}'\n  hint: valid collections are: students, classes, schedules, tasks, grades, attendance")]
    UnknownCollection(String),

    #[error("invalid operation kind: '{0}'\n  hint: valid kinds are: create, update, upsert, delete")]
    InvalidOperationKind(String),

    #[error("invalid status: '{0}'\n  hint: valid statuses are: pending, processing, failed, success")]
    InvalidStatus(String),

    #[error("invalid conflict strategy: '{0}'\n  hint: valid strategies are: local_wins, server_wins, merge, manual")]
    InvalidStrategy(String),

    #[error("invalid payload for {collection}.{field}: {reason}")]
    Validation {
        collection: String,
        field: String,
        reason: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

impl Error {
    /// Returns true if this error rejects caller input before it reaches the queue.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. }
                | Error::UnknownCollection(_)
                | Error::InvalidOperationKind(_)
        )
    }
}

/// A specialized Result type for gs-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
