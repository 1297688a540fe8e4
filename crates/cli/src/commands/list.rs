// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use gs_core::{Collection, MutationStatus, QueuedMutation};

use super::{write_json, Workspace};
use crate::cli::OutputFormat;
use crate::colors;
use crate::display::{format_item, format_item_detail};
use crate::error::{Error, Result};

pub fn run<W: Write>(
    ws: &Workspace,
    out: &mut W,
    status: Option<MutationStatus>,
    collection: Option<Collection>,
    output: OutputFormat,
) -> Result<()> {
    let items: Vec<QueuedMutation> = ws
        .queue
        .get_queue()
        .into_iter()
        .filter(|m| status.map_or(true, |s| m.status == s))
        .filter(|m| collection.map_or(true, |c| m.collection == c))
        .collect();

    match output {
        OutputFormat::Json => write_json(out, &items),
        OutputFormat::Text => {
            if items.is_empty() {
                writeln!(out, "{}", colors::context("Queue is empty"))?;
                return Ok(());
            }
            for item in &items {
                let line = format_item(item);
                if item.status == MutationStatus::Failed {
                    writeln!(out, "{}", colors::alert(&line))?;
                } else {
                    writeln!(out, "{line}")?;
                }
            }
            Ok(())
        }
    }
}

pub fn show<W: Write>(ws: &Workspace, out: &mut W, id: &str, output: OutputFormat) -> Result<()> {
    let item = ws
        .queue
        .get(id)
        .ok_or_else(|| Error::Sync(gs_sync::Error::MutationNotFound(id.to_string())))?;
    match output {
        OutputFormat::Json => write_json(out, &item),
        OutputFormat::Text => {
            for line in format_item_detail(&item) {
                writeln!(out, "{line}")?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
