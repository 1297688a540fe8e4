// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use gs_core::Collection;

use super::Workspace;
use crate::error::Result;

pub fn purge<W: Write>(ws: &Workspace, out: &mut W) -> Result<()> {
    let n = ws.cache.purge_expired();
    writeln!(out, "Purged {n} expired entries, {} left", ws.cache.len())?;
    Ok(())
}

pub fn clear<W: Write>(ws: &Workspace, out: &mut W, collection: Option<Collection>) -> Result<()> {
    let n = ws.cache.invalidate(collection.as_ref().map(Collection::as_str));
    match collection {
        Some(c) => writeln!(out, "Removed {n} cached {c} reads")?,
        None => writeln!(out, "Removed {n} cached reads")?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
