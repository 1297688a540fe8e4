// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by `gsq`.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Sync(#[from] gs_sync::Error),

    #[error("invalid payload JSON: {0}\n  hint: pass a single JSON object, e.g. '{{\"id\": \"s1\", \"name\": \"Ani\"}}'")]
    InvalidJson(#[source] serde_json::Error),

    #[error("failed to encode output: {0}")]
    Output(#[source] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<gs_core::Error> for Error {
    fn from(e: gs_core::Error) -> Self {
        Error::Sync(e.into())
    }
}

impl Error {
    /// Exit code for the process: 2 for input the user can fix, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidJson(_) | Error::Sync(gs_sync::Error::Core(_)) => 2,
            _ => 1,
        }
    }
}

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
