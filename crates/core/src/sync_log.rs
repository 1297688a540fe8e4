// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only audit trail of sync attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::mutation::{MutationId, OperationKind, QueuedMutation};
use crate::payload::Collection;

/// Result of one attempt to apply a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Success,
    Conflict,
    Failed,
}

impl SyncOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOutcome::Success => "success",
            SyncOutcome::Conflict => "conflict",
            SyncOutcome::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SyncOutcome {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "success" => Ok(SyncOutcome::Success),
            "conflict" => Ok(SyncOutcome::Conflict),
            "failed" => Ok(SyncOutcome::Failed),
            _ => Err(Error::CorruptedData(format!("unknown sync outcome '{s}'"))),
        }
    }
}

/// One audit row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncLogRecord {
    pub item_id: MutationId,
    pub operation: OperationKind,
    pub collection: Collection,
    pub result: SyncOutcome,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncLogRecord {
    /// Builds a record describing an attempt on `item`.
    pub fn for_item(
        item: &QueuedMutation,
        result: SyncOutcome,
        timestamp: DateTime<Utc>,
        error: Option<String>,
    ) -> Self {
        SyncLogRecord {
            item_id: item.id.clone(),
            operation: item.operation,
            collection: item.collection,
            result,
            timestamp,
            error,
        }
    }
}
