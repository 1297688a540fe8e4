// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::path::Path;

use gs_sync::SyncConfig;

use crate::error::Result;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Prints the effective configuration, defaults filled in.
pub fn show<W: Write>(state_dir: &Path, out: &mut W) -> Result<()> {
    let config = SyncConfig::load(state_dir)?;
    let text = toml::to_string_pretty(&config)
        .map_err(|e| gs_sync::Error::Config(format!("failed to serialize config: {e}")))?;
    write!(out, "{text}")?;
    Ok(())
}

/// Writes the default configuration unless one already exists.
pub fn init<W: Write>(state_dir: &Path, out: &mut W) -> Result<()> {
    let path = state_dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        writeln!(out, "Config already exists at {}", path.display())?;
        return Ok(());
    }
    SyncConfig::default().save(state_dir)?;
    writeln!(out, "Wrote {}", path.display())?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
