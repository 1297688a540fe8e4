// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue maintenance: retry, clear and discard.

use std::io::Write;

use super::Workspace;
use crate::error::Result;

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

pub fn retry_failed<W: Write>(ws: &Workspace, out: &mut W) -> Result<()> {
    let n = ws.queue.retry_failed();
    if n == 0 {
        writeln!(out, "No failed writes")?;
    } else {
        writeln!(
            out,
            "Requeued {n} write{} with a fresh retry budget",
            plural(n)
        )?;
    }
    Ok(())
}

pub fn clear_failed<W: Write>(ws: &Workspace, out: &mut W) -> Result<()> {
    let n = ws.queue.clear_failed();
    writeln!(out, "Dropped {n} failed write{}", plural(n))?;
    Ok(())
}

pub fn discard<W: Write>(ws: &Workspace, out: &mut W, id: &str) -> Result<()> {
    let removed = ws.queue.remove(id)?;
    writeln!(
        out,
        "Discarded {} ({} {})",
        removed.id,
        removed.operation,
        crate::display::target(&removed)
    )?;
    Ok(())
}

pub fn clear<W: Write>(ws: &Workspace, out: &mut W) -> Result<()> {
    let n = ws.queue.clear();
    writeln!(out, "Dropped {n} queued write{}", plural(n))?;
    let left = ws.queue.len();
    if left > 0 {
        writeln!(out, "{left} write{} still being applied", plural(left))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
