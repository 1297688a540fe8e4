// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Conflict detection and resolution between a local mutation and the
//! server's copy of the same record.
//!
//! Resolution rules:
//! - `local_wins`: reapply the local payload onto the server's identity
//! - `server_wins`: drop the local write, keep the server state
//! - `merge`: per field, the newer side wins, judged by the record-level
//!   timestamps only
//! - `manual`: park the item with both versions for the caller to decide
//!
//! Limitation: there is no per-field change tracking. `merge` compares the
//! mutation's capture time against the server record's last-modified time, so
//! every field of one side is treated as modified at that single instant. A
//! server edit to an unrelated field still makes the whole local payload
//! "older" than the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::mutation::QueuedMutation;
use crate::payload::{Payload, IDENTITY_FIELD};

/// The server's current version of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerRecord {
    /// Record identity.
    pub id: String,
    /// When the server last modified the record.
    pub last_modified: DateTime<Utc>,
    /// Record fields as the server holds them.
    pub fields: Payload,
}

impl ServerRecord {
    /// Creates a server record snapshot.
    pub fn new(id: impl Into<String>, last_modified: DateTime<Utc>, fields: Payload) -> Self {
        ServerRecord {
            id: id.into(),
            last_modified,
            fields,
        }
    }

    /// The server fields with the identity field filled in.
    pub fn to_payload(&self) -> Payload {
        let mut record = self.fields.clone();
        record.insert(IDENTITY_FIELD.to_string(), self.id.clone().into());
        record
    }
}

/// How to settle a detected conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStrategy {
    LocalWins,
    ServerWins,
    Merge,
    #[default]
    Manual,
}

impl ConflictStrategy {
    /// Returns the string representation used in config and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictStrategy::LocalWins => "local_wins",
            ConflictStrategy::ServerWins => "server_wins",
            ConflictStrategy::Merge => "merge",
            ConflictStrategy::Manual => "manual",
        }
    }
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConflictStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "local_wins" | "local" => Ok(ConflictStrategy::LocalWins),
            "server_wins" | "server" => Ok(ConflictStrategy::ServerWins),
            "merge" => Ok(ConflictStrategy::Merge),
            "manual" => Ok(ConflictStrategy::Manual),
            _ => Err(Error::InvalidStrategy(s.to_string())),
        }
    }
}

/// Outcome of resolving a conflict.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Send this record to the server in place of the original payload.
    Reapply(Payload),
    /// Keep the server's record; the local write is dropped.
    Discard(Payload),
    /// Leave both versions for the caller to reconcile.
    ManualRequired { local: Payload, server: ServerRecord },
}

impl Resolution {
    /// The record that ends up authoritative, if one was chosen.
    pub fn record(&self) -> Option<&Payload> {
        match self {
            Resolution::Reapply(record) | Resolution::Discard(record) => Some(record),
            Resolution::ManualRequired { .. } => None,
        }
    }
}

/// Returns true iff `server` holds the same record and changed it after the
/// local mutation was captured.
pub fn detect_conflict(local: &QueuedMutation, server: Option<&ServerRecord>) -> bool {
    let Some(server) = server else {
        return false;
    };
    match local.record_id() {
        Some(id) if id == server.id => server.last_modified > local.local_timestamp,
        _ => false,
    }
}

/// Settles a conflict between `local` and `server` using `strategy`.
pub fn resolve(local: &QueuedMutation, server: &ServerRecord, strategy: ConflictStrategy) -> Resolution {
    match strategy {
        ConflictStrategy::LocalWins => {
            let mut record = Payload::new();
            record.insert(IDENTITY_FIELD.to_string(), server.id.clone().into());
            for (field, value) in &local.payload {
                record.insert(field.clone(), value.clone());
            }
            Resolution::Reapply(record)
        }
        ConflictStrategy::ServerWins => Resolution::Discard(server.to_payload()),
        ConflictStrategy::Merge => Resolution::Reapply(merge(local, server)),
        ConflictStrategy::Manual => Resolution::ManualRequired {
            local: local.payload.clone(),
            server: server.clone(),
        },
    }
}

fn merge(local: &QueuedMutation, server: &ServerRecord) -> Payload {
    let local_is_newer = local.local_timestamp > server.last_modified;
    let mut record = server.to_payload();
    for (field, value) in &local.payload {
        if field == IDENTITY_FIELD {
            continue;
        }
        // Fields the server has never seen have no competing value.
        if local_is_newer || !server.fields.contains_key(field) {
            record.insert(field.clone(), value.clone());
        }
    }
    record
}

#[cfg(test)]
#[path = "conflict_tests.rs"]
mod tests;
