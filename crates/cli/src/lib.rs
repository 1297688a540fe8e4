// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! gurusync - command line access to the offline write queue.
//!
//! The `gsq` binary opens the same state directory a running sync engine
//! uses and lets an operator inspect the queue, retry or discard failed
//! writes, settle conflicts and manage the read cache. It never talks to the
//! remote service itself.
//!
//! # Main Components
//!
//! - [`Cli`] - argument definitions
//! - [`run`] - dispatches a parsed command against an opened [`Workspace`]
//! - [`Error`] - errors with user-facing hints

mod cli;
pub mod colors;
mod commands;
mod display;
pub mod error;
mod help;

pub use cli::{CacheCommand, Cli, Command, ConfigCommand, OutputFormat};
pub use commands::Workspace;
pub use error::{Error, Result};

use std::io::Write;

use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Sends engine logs to stderr.
///
/// `RUST_LOG` wins when set; otherwise only warnings are shown, or debug
/// output with `--verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Runs `cli` and writes its output to stdout.
pub fn run(cli: Cli) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with(cli, &mut out)?;
    out.flush()?;
    Ok(())
}

fn run_with<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let state_dir = cli.state_dir.as_deref();

    // Config commands only touch the file, not the queue.
    if let Command::Config(command) = &cli.command {
        let dir = gs_sync::resolve_state_dir(state_dir)?;
        return match command {
            ConfigCommand::Show => commands::config::show(&dir, out),
            ConfigCommand::Init => commands::config::init(&dir, out),
        };
    }

    let ws = Workspace::open(state_dir)?;
    debug!(
        state_dir = %ws.state_dir.display(),
        store = %ws.queue.store_kind(),
        "workspace opened"
    );

    match cli.command {
        Command::Status { output } => commands::status::run(&ws, out, output),
        Command::List {
            status,
            collection,
            output,
        } => commands::list::run(&ws, out, status, collection, output),
        Command::Show { id, output } => commands::list::show(&ws, out, &id, output),
        Command::Enqueue {
            collection,
            operation,
            payload,
            priority,
        } => commands::enqueue::run(&ws, out, collection, operation, &payload, priority),
        Command::RetryFailed => commands::queue::retry_failed(&ws, out),
        Command::ClearFailed => commands::queue::clear_failed(&ws, out),
        Command::Discard { id } => commands::queue::discard(&ws, out, &id),
        Command::Clear => commands::queue::clear(&ws, out),
        Command::Resolve { id, strategy } => commands::resolve::run(&ws, out, &id, strategy),
        Command::Log { clear: true, .. } => commands::log::clear(&ws, out),
        Command::Log { limit, .. } => commands::log::run(&ws, out, limit),
        Command::Cache(CacheCommand::Purge) => commands::cache::purge(&ws, out),
        Command::Cache(CacheCommand::Clear { collection }) => {
            commands::cache::clear(&ws, out, collection)
        }
        Command::Config(_) => Ok(()),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
