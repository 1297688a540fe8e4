// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use gs_core::{ConflictStrategy, Resolution};

use super::Workspace;
use crate::error::Result;

pub fn run<W: Write>(
    ws: &Workspace,
    out: &mut W,
    id: &str,
    strategy: ConflictStrategy,
) -> Result<()> {
    match ws.queue.resolve_conflict(id, strategy)? {
        Resolution::Reapply(_) => {
            writeln!(out, "Requeued {id} with the {strategy} record")?;
        }
        Resolution::Discard(_) => {
            writeln!(out, "Dropped {id}, keeping the server copy")?;
        }
        Resolution::ManualRequired { .. } => {
            writeln!(out, "{id} still needs a decision")?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
