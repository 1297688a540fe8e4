// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use gs_core::{Collection, OperationKind};
use serde_json::Value;

use super::Workspace;
use crate::error::{Error, Result};

/// Queues a write and prints its id.
pub fn run<W: Write>(
    ws: &Workspace,
    out: &mut W,
    collection: Collection,
    operation: OperationKind,
    payload: &str,
    priority: Option<i32>,
) -> Result<()> {
    let payload: Value = serde_json::from_str(payload).map_err(Error::InvalidJson)?;
    let id = ws.queue.enqueue(operation, collection, payload, priority)?;
    writeln!(out, "{id}")?;
    Ok(())
}

#[cfg(test)]
#[path = "enqueue_tests.rs"]
mod tests;
