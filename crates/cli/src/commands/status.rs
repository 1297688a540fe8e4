// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use chrono::Utc;
use serde_json::json;

use super::{write_json, Workspace};
use crate::cli::OutputFormat;
use crate::colors;
use crate::display::format_age;
use crate::error::Result;

pub fn run<W: Write>(ws: &Workspace, out: &mut W, output: OutputFormat) -> Result<()> {
    let stats = ws.queue.stats();
    let store = ws.queue.store_kind();

    if output == OutputFormat::Json {
        return write_json(
            out,
            &json!({
                "state_dir": ws.state_dir,
                "store": store.as_str(),
                "durable": store.is_durable(),
                "pending": stats.pending,
                "processing": stats.processing,
                "failed": stats.failed,
                "conflicted": stats.conflicted,
                "oldest_pending": stats.oldest_pending,
                "cached_reads": ws.cache.len(),
            }),
        );
    }

    writeln!(out, "{}", colors::header("Queue:"))?;
    writeln!(out, "  pending:    {}", stats.pending)?;
    if stats.processing > 0 {
        writeln!(out, "  processing: {}", stats.processing)?;
    }
    let failed = format!("{}", stats.failed);
    writeln!(
        out,
        "  failed:     {}",
        if stats.failed > 0 {
            colors::alert(&failed)
        } else {
            failed
        }
    )?;
    if stats.conflicted > 0 {
        writeln!(
            out,
            "  conflicts:  {} {}",
            stats.conflicted,
            colors::context("(gsq resolve <id> <strategy>)")
        )?;
    }
    if let Some(oldest) = stats.oldest_pending {
        writeln!(out, "  oldest:     {} ago", format_age(oldest, Utc::now()))?;
    }

    writeln!(out, "{}", colors::header("Storage:"))?;
    writeln!(out, "  store:      {store}")?;
    if !store.is_durable() {
        writeln!(
            out,
            "  {}",
            colors::alert("warning: writes will not survive a restart")
        )?;
    }
    writeln!(out, "  state dir:  {}", ws.state_dir.display())?;
    writeln!(out, "  cached:     {} reads", ws.cache.len())?;
    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
