// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! gs-core: Shared data model for the gurusync offline mutation engine.
//!
//! This crate provides the queued mutation types, payload schemas, conflict
//! resolution rules, and storage primitives used by both the sync engine and
//! the `gsq` operator CLI.

pub mod cache;
pub mod clock;
pub mod conflict;
pub mod error;
pub mod jsonl;
pub mod mutation;
pub mod payload;
pub mod sync_log;

pub use cache::CacheEntry;
pub use clock::{offset, ClockSource, ManualClock, SystemClock};
pub use conflict::{detect_conflict, resolve, ConflictStrategy, Resolution, ServerRecord};
pub use error::{Error, Result};
pub use mutation::{generate_mutation_id, MutationId, MutationStatus, OperationKind, QueuedMutation};
pub use payload::{validate, Collection, Payload, IDENTITY_FIELD};
pub use sync_log::{SyncLogRecord, SyncOutcome};
