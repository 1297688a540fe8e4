// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queued mutations: pending local writes awaiting replay.
//!
//! Every write issued while the remote service may be unreachable is captured
//! as a [`QueuedMutation`]. Mutations are:
//!
//! - Serializable: stored in the durable queue and the flat-list fallback
//! - Ordered: higher priority first, then enqueue order
//! - Bounded: `retry_count` never exceeds `max_retries`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::conflict::ServerRecord;
use crate::error::{Error, Result};
use crate::payload::{Collection, Payload, IDENTITY_FIELD};

/// Unique identifier for a queued mutation.
pub type MutationId = String;

/// The kind of write a mutation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Insert a new record.
    Create,
    /// Change fields of an existing record.
    Update,
    /// Insert or replace a record by identity.
    Upsert,
    /// Remove a record.
    Delete,
}

impl OperationKind {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Upsert => "upsert",
            OperationKind::Delete => "delete",
        }
    }

    /// True if the payload must name an existing record.
    pub fn requires_identity(&self) -> bool {
        !matches!(self, OperationKind::Create)
    }

    /// True if applying this operation can bring a new record into existence.
    pub fn may_create(&self) -> bool {
        matches!(self, OperationKind::Create | OperationKind::Upsert)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "create" => Ok(OperationKind::Create),
            "update" => Ok(OperationKind::Update),
            "upsert" => Ok(OperationKind::Upsert),
            "delete" => Ok(OperationKind::Delete),
            _ => Err(Error::InvalidOperationKind(s.to_string())),
        }
    }
}

/// Lifecycle state of a queued mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationStatus {
    /// Waiting to be applied (possibly after a scheduled backoff).
    Pending,
    /// Currently being applied against the remote.
    Processing,
    /// Needs manual action: retries exhausted, rejected, or unresolved conflict.
    Failed,
    /// Applied; removed from the queue at the end of the pass.
    Success,
}

impl MutationStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationStatus::Pending => "pending",
            MutationStatus::Processing => "processing",
            MutationStatus::Failed => "failed",
            MutationStatus::Success => "success",
        }
    }
}

impl fmt::Display for MutationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MutationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(MutationStatus::Pending),
            "processing" => Ok(MutationStatus::Processing),
            "failed" => Ok(MutationStatus::Failed),
            "success" => Ok(MutationStatus::Success),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// A pending local write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedMutation {
    /// Stable identifier assigned at enqueue time.
    pub id: MutationId,
    /// Enqueue order, used to break priority ties.
    pub sequence: u64,
    pub operation: OperationKind,
    pub collection: Collection,
    pub payload: Payload,
    /// Capture-time clock reading, compared against server modification times.
    pub local_timestamp: DateTime<Utc>,
    /// Higher values are serviced first.
    pub priority: i32,
    pub status: MutationStatus,
    pub retry_count: u32,
    pub max_retries: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Earliest time a retried item may be attempted again.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_attempt_at: Option<DateTime<Utc>>,
    /// Server record captured when a conflict needed manual resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict_snapshot: Option<ServerRecord>,
}

impl QueuedMutation {
    /// Creates a new pending mutation with a fresh retry budget.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: MutationId,
        sequence: u64,
        operation: OperationKind,
        collection: Collection,
        payload: Payload,
        priority: i32,
        max_retries: u32,
        captured_at: DateTime<Utc>,
    ) -> Self {
        QueuedMutation {
            id,
            sequence,
            operation,
            collection,
            payload,
            local_timestamp: captured_at,
            priority,
            status: MutationStatus::Pending,
            retry_count: 0,
            max_retries,
            last_attempt_at: None,
            last_error: None,
            next_attempt_at: None,
            conflict_snapshot: None,
        }
    }

    /// Returns the identity of the record this mutation targets, if any.
    pub fn record_id(&self) -> Option<&str> {
        self.payload.get(IDENTITY_FIELD).and_then(|v| v.as_str())
    }

    /// Queue order: descending priority, then ascending enqueue sequence.
    pub fn queue_order(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }

    /// True if the item may be attempted at `now`.
    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        self.status == MutationStatus::Pending && self.next_attempt_at.map_or(true, |t| t <= now)
    }

    /// True if the item is parked on an unresolved conflict.
    pub fn has_conflict(&self) -> bool {
        self.status == MutationStatus::Failed && self.conflict_snapshot.is_some()
    }

    /// True once the retry budget is spent.
    pub fn retries_exhausted(&self) -> bool {
        self.retry_count >= self.max_retries
    }

    /// Puts the item back to a fresh pending state with a full retry budget.
    pub fn reset_for_retry(&mut self) {
        self.status = MutationStatus::Pending;
        self.retry_count = 0;
        self.next_attempt_at = None;
        self.conflict_snapshot = None;
    }
}

/// Generates a mutation ID from a client nonce, capture time, and sequence.
///
/// Format: `mut-{hash}` where hash is the first 16 hex chars of
/// SHA256(nonce + timestamp + sequence).
pub fn generate_mutation_id(nonce: &str, captured_at: &DateTime<Utc>, sequence: u64) -> MutationId {
    let input = format!("{}{}{}", nonce, captured_at.to_rfc3339(), sequence);
    let hash = Sha256::digest(input.as_bytes());
    format!("mut-{}", hex::encode(&hash[..8]))
}

#[cfg(test)]
#[path = "mutation_tests.rs"]
mod tests;
