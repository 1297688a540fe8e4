// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use gs_core::{CacheEntry, QueuedMutation, ServerRecord, SyncLogRecord};
use rusqlite::{params, Connection, Row};

use super::{QueueStore, StoreKind};
use crate::error::{Error, Result};

/// Schema for the three store regions.
pub const SCHEMA: &str = r#"
-- Pending local writes, one row per mutation
CREATE TABLE IF NOT EXISTS queue (
    id TEXT PRIMARY KEY,
    sequence INTEGER NOT NULL,
    operation TEXT NOT NULL,
    collection TEXT NOT NULL,
    payload TEXT NOT NULL,
    local_timestamp TEXT NOT NULL,
    priority INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'pending',
    retry_count INTEGER NOT NULL DEFAULT 0,
    max_retries INTEGER NOT NULL,
    last_attempt_at TEXT,
    last_error TEXT,
    next_attempt_at TEXT,
    conflict_snapshot TEXT
);

-- Read cache
CREATE TABLE IF NOT EXISTS cache (
    key TEXT PRIMARY KEY,
    collection TEXT NOT NULL,
    value TEXT NOT NULL,
    cached_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

-- Append-only audit trail
CREATE TABLE IF NOT EXISTS sync_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_id TEXT NOT NULL,
    operation TEXT NOT NULL,
    collection TEXT NOT NULL,
    result TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    error TEXT
);

CREATE INDEX IF NOT EXISTS idx_queue_status ON queue(status);
CREATE INDEX IF NOT EXISTS idx_cache_collection ON cache(collection);
"#;

/// Store backed by a single SQLite database file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn corrupted(message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(gs_core::Error::CorruptedData(message)),
    )
}

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value
        .parse()
        .map_err(|_| corrupted(format!("invalid value '{value}' in column '{column}'")))
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| corrupted(format!("invalid timestamp '{value}' in column '{column}'")))
}

fn parse_timestamp_opt(
    value: Option<String>,
    column: &str,
) -> std::result::Result<Option<DateTime<Utc>>, rusqlite::Error> {
    value.map(|v| parse_timestamp(&v, column)).transpose()
}

fn parse_json<T: serde::de::DeserializeOwned>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    serde_json::from_str(value)
        .map_err(|e| corrupted(format!("invalid JSON in column '{column}': {e}")))
}

fn row_to_mutation(row: &Row<'_>) -> std::result::Result<QueuedMutation, rusqlite::Error> {
    let operation: String = row.get("operation")?;
    let collection: String = row.get("collection")?;
    let payload: String = row.get("payload")?;
    let local_timestamp: String = row.get("local_timestamp")?;
    let status: String = row.get("status")?;
    let sequence: i64 = row.get("sequence")?;
    let snapshot: Option<String> = row.get("conflict_snapshot")?;

    Ok(QueuedMutation {
        id: row.get("id")?,
        sequence: u64::try_from(sequence)
            .map_err(|_| corrupted(format!("negative sequence {sequence}")))?,
        operation: parse_db(&operation, "operation")?,
        collection: parse_db(&collection, "collection")?,
        payload: parse_json(&payload, "payload")?,
        local_timestamp: parse_timestamp(&local_timestamp, "local_timestamp")?,
        priority: row.get("priority")?,
        status: parse_db(&status, "status")?,
        retry_count: row.get("retry_count")?,
        max_retries: row.get("max_retries")?,
        last_attempt_at: parse_timestamp_opt(row.get("last_attempt_at")?, "last_attempt_at")?,
        last_error: row.get("last_error")?,
        next_attempt_at: parse_timestamp_opt(row.get("next_attempt_at")?, "next_attempt_at")?,
        conflict_snapshot: snapshot
            .map(|s| parse_json::<ServerRecord>(&s, "conflict_snapshot"))
            .transpose()?,
    })
}

fn row_to_cache_entry(row: &Row<'_>) -> std::result::Result<CacheEntry, rusqlite::Error> {
    let value: String = row.get("value")?;
    let cached_at: String = row.get("cached_at")?;
    let expires_at: String = row.get("expires_at")?;
    Ok(CacheEntry {
        key: row.get("key")?,
        collection: row.get("collection")?,
        value: parse_json(&value, "value")?,
        cached_at: parse_timestamp(&cached_at, "cached_at")?,
        expires_at: parse_timestamp(&expires_at, "expires_at")?,
    })
}

fn row_to_log_record(row: &Row<'_>) -> std::result::Result<SyncLogRecord, rusqlite::Error> {
    let operation: String = row.get("operation")?;
    let collection: String = row.get("collection")?;
    let result: String = row.get("result")?;
    let timestamp: String = row.get("timestamp")?;
    Ok(SyncLogRecord {
        item_id: row.get("item_id")?,
        operation: parse_db(&operation, "operation")?,
        collection: parse_db(&collection, "collection")?,
        result: parse_db(&result, "result")?,
        timestamp: parse_timestamp(&timestamp, "timestamp")?,
        error: row.get("error")?,
    })
}

impl QueueStore for SqliteStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Sqlite
    }

    fn load_queue(&self) -> Result<Vec<QueuedMutation>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, sequence, operation, collection, payload, local_timestamp, priority,
                    status, retry_count, max_retries, last_attempt_at, last_error,
                    next_attempt_at, conflict_snapshot
             FROM queue ORDER BY priority DESC, sequence ASC",
        )?;
        let items = stmt
            .query_map([], row_to_mutation)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn save_queue(&self, items: &[QueuedMutation]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM queue", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO queue (id, sequence, operation, collection, payload, local_timestamp,
                 priority, status, retry_count, max_retries, last_attempt_at, last_error,
                 next_attempt_at, conflict_snapshot)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            )?;
            for item in items {
                let sequence = i64::try_from(item.sequence).map_err(|_| {
                    Error::Storage(format!("sequence {} out of range", item.sequence))
                })?;
                let snapshot = item
                    .conflict_snapshot
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?;
                stmt.execute(params![
                    item.id,
                    sequence,
                    item.operation.as_str(),
                    item.collection.as_str(),
                    serde_json::to_string(&item.payload)?,
                    item.local_timestamp.to_rfc3339(),
                    item.priority,
                    item.status.as_str(),
                    item.retry_count,
                    item.max_retries,
                    item.last_attempt_at.map(|t| t.to_rfc3339()),
                    item.last_error,
                    item.next_attempt_at.map(|t| t.to_rfc3339()),
                    snapshot,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_cache(&self) -> Result<Vec<CacheEntry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT key, collection, value, cached_at, expires_at FROM cache ORDER BY cached_at",
        )?;
        let entries = stmt
            .query_map([], row_to_cache_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn put_cache(&self, entry: &CacheEntry) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO cache (key, collection, value, cached_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.key,
                entry.collection,
                serde_json::to_string(&entry.value)?,
                entry.cached_at.to_rfc3339(),
                entry.expires_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn remove_cache(&self, keys: &[String]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        for key in keys {
            tx.execute("DELETE FROM cache WHERE key = ?1", [key])?;
        }
        tx.commit()?;
        Ok(())
    }

    fn clear_cache(&self) -> Result<()> {
        self.conn().execute("DELETE FROM cache", [])?;
        Ok(())
    }

    fn append_log(&self, record: &SyncLogRecord) -> Result<()> {
        self.conn().execute(
            "INSERT INTO sync_log (item_id, operation, collection, result, timestamp, error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.item_id,
                record.operation.as_str(),
                record.collection.as_str(),
                record.result.as_str(),
                record.timestamp.to_rfc3339(),
                record.error,
            ],
        )?;
        Ok(())
    }

    fn read_log(&self, limit: usize) -> Result<Vec<SyncLogRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT item_id, operation, collection, result, timestamp, error
             FROM sync_log ORDER BY id DESC LIMIT ?1",
        )?;
        let records = stmt
            .query_map([limit], row_to_log_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn clear_log(&self) -> Result<()> {
        self.conn().execute("DELETE FROM sync_log", [])?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
