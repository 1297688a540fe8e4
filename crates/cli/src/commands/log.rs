// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use super::Workspace;
use crate::display::format_log_record;
use crate::error::Result;

pub fn run<W: Write>(ws: &Workspace, out: &mut W, limit: usize) -> Result<()> {
    let records = ws.queue.read_log(limit)?;
    if records.is_empty() {
        writeln!(out, "No sync attempts recorded")?;
    }
    for record in &records {
        writeln!(out, "{}", format_log_record(record))?;
    }
    Ok(())
}

pub fn clear<W: Write>(ws: &Workspace, out: &mut W) -> Result<()> {
    ws.queue.clear_log()?;
    writeln!(out, "Sync log cleared")?;
    Ok(())
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
