// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use gs_core::{Collection, ConflictStrategy, MutationStatus, OperationKind};

use crate::colors;
use crate::help;

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn parse_collection(s: &str) -> Result<Collection, String> {
    s.parse().map_err(|e: gs_core::Error| e.to_string())
}

fn parse_operation(s: &str) -> Result<OperationKind, String> {
    s.parse().map_err(|e: gs_core::Error| e.to_string())
}

fn parse_status(s: &str) -> Result<MutationStatus, String> {
    s.parse().map_err(|e: gs_core::Error| e.to_string())
}

fn parse_strategy(s: &str) -> Result<ConflictStrategy, String> {
    s.parse().map_err(|e: gs_core::Error| e.to_string())
}

#[derive(Parser)]
#[command(name = "gsq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and manage the offline write queue of a school portal client")]
#[command(
    long_about = "Inspect and manage the offline write queue of a school portal client.\n\n\
    Writes made while offline wait in a local queue until they can be replayed. \
    gsq shows what is waiting, what failed, and lets you retry, resolve or discard it."
)]
#[command(styles = help::styles())]
pub struct Cli {
    /// State directory (default: $GURUSYNC_STATE_DIR or the platform data dir)
    #[arg(long, global = true, value_name = "path")]
    pub state_dir: Option<PathBuf>,

    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show queue counts and the active store
    Status {
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// List queued writes in service order
    #[command(after_help = colors::examples("\
Examples:
  gsq list                        Everything in the queue
  gsq list -s failed              Only failed items
  gsq list -c grades -o json      Grade writes as JSON"))]
    List {
        /// Only items in this state (pending, processing, failed)
        #[arg(long, short, value_parser = parse_status)]
        status: Option<MutationStatus>,

        /// Only items for this collection
        #[arg(long, short, value_parser = parse_collection)]
        collection: Option<Collection>,

        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Show one queued write in full
    Show {
        id: String,

        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Queue a write
    #[command(after_help = colors::examples("\
Examples:
  gsq enqueue students update '{\"id\": \"s1\", \"name\": \"Ani\"}' -p 5
  gsq enqueue classes create '{\"name\": \"7A\", \"grade_level\": 7}'
  gsq enqueue tasks delete '{\"id\": \"task-9\"}'"))]
    Enqueue {
        /// Target collection (students, classes, schedules, tasks, grades, attendance)
        #[arg(value_parser = parse_collection)]
        collection: Collection,

        /// Operation (create, update, upsert, delete)
        #[arg(value_parser = parse_operation)]
        operation: OperationKind,

        /// Record payload as a JSON object
        payload: String,

        /// Higher values are replayed first
        #[arg(long, short, allow_negative_numbers = true)]
        priority: Option<i32>,
    },

    /// Give every failed write a fresh retry budget
    RetryFailed,

    /// Drop every failed write
    ClearFailed,

    /// Drop one write, whatever its state
    Discard { id: String },

    /// Drop every write not currently being applied
    Clear,

    /// Settle a parked conflict
    #[command(after_help = colors::examples("\
Examples:
  gsq resolve mut-3f2a9c01d4e5b6a7 local_wins    Keep the local change
  gsq resolve mut-3f2a9c01d4e5b6a7 server_wins   Keep the server copy
  gsq resolve mut-3f2a9c01d4e5b6a7 merge         Combine both"))]
    Resolve {
        id: String,

        /// local_wins, server_wins or merge
        #[arg(value_parser = parse_strategy)]
        strategy: ConflictStrategy,
    },

    /// Show recent sync attempts, newest first
    Log {
        /// Maximum records to show
        #[arg(long, short = 'n', default_value_t = 20)]
        limit: usize,

        /// Delete the log instead of showing it
        #[arg(long, conflicts_with = "limit")]
        clear: bool,
    },

    /// Manage the read cache
    #[command(subcommand)]
    Cache(CacheCommand),

    /// Show or write configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// Remove expired entries
    Purge,

    /// Remove entries, all of them or one collection's
    Clear {
        #[arg(long, short, value_parser = parse_collection)]
        collection: Option<Collection>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Write the default configuration if none exists
    Init,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
