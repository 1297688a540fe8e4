// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive ownership of a state directory.
//!
//! One process at a time may read-modify-write the queue. The lock is an
//! advisory `flock` on `<state_dir>/gurusync.lock`, released when the
//! [`StateLock`] is dropped or the process exits.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::error::{Error, Result};

const LOCK_FILE_NAME: &str = "gurusync.lock";

/// Held for as long as the state directory is in use.
#[derive(Debug)]
pub struct StateLock {
    file: File,
    path: PathBuf,
}

impl StateLock {
    /// Takes the lock without waiting; fails with [`Error::Locked`] if held.
    pub fn acquire(state_dir: &Path) -> Result<Self> {
        fs::create_dir_all(state_dir)?;
        let path = state_dir.join(LOCK_FILE_NAME);
        let file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        file.try_lock_exclusive()
            .map_err(|_| Error::Locked(state_dir.to_path_buf()))?;
        debug!(path = %path.display(), "state directory locked");
        Ok(StateLock { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
