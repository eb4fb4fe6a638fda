// Copyright (C) 2025 The Asyncrawler Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A durable key→blob mapping backed by SQLite, matching the schema in
//! the external interfaces section of the project's design notes:
//!
//! ```sql
//! CREATE TABLE cache (
//!   key     TEXT PRIMARY KEY NOT NULL UNIQUE,
//!   value   BLOB,
//!   updated TIMESTAMP DEFAULT (datetime('now','localtime'))
//! );
//! ```
//!
//! Values are `bincode`-serialized then gzip-compressed before being
//! written as a `BLOB`, the same serialize-then-compress pipeline the
//! teacher's local storage backend used for response bodies.

use std::io::{Read, Write};
use std::path::Path;

use chrono::{Local, NaiveDateTime};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{CrawlError, Result};

/// Key under which the queue snapshot pair is stored (see `snapshot`
/// module). Reserved — never a valid fingerprint's decimal form collides
/// with it because fingerprints are purely numeric.
pub const SNAPSHOT_KEY: &str = "queue";

pub struct PersistentStore {
    conn: Connection,
    compress_level: u32,
    /// `None` disables freshness expiry entirely.
    expires: Option<chrono::Duration>,
    max_operations: u64,
    operations: u64,
    in_txn: bool,
}

impl PersistentStore {
    pub fn open(
        path: &Path,
        compress_level: u32,
        freshness_secs: Option<u64>,
        max_operations: u64,
    ) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS cache (
                key     TEXT PRIMARY KEY NOT NULL UNIQUE,
                value   BLOB,
                updated TIMESTAMP DEFAULT (datetime('now','localtime'))
            );",
        )?;
        Ok(PersistentStore {
            conn,
            compress_level: compress_level.clamp(1, 9),
            expires: freshness_secs.map(|s| chrono::Duration::seconds(s as i64)),
            max_operations: max_operations.max(1),
            operations: 0,
            in_txn: false,
        })
    }

    /// An in-memory store, for tests that don't care about disk state.
    pub fn open_in_memory(freshness_secs: Option<u64>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS cache (
                key     TEXT PRIMARY KEY NOT NULL UNIQUE,
                value   BLOB,
                updated TIMESTAMP DEFAULT (datetime('now','localtime'))
            );",
        )?;
        Ok(PersistentStore {
            conn,
            compress_level: 6,
            expires: freshness_secs.map(|s| chrono::Duration::seconds(s as i64)),
            max_operations: 1000,
            operations: 0,
            in_txn: false,
        })
    }

    fn begin_if_needed(&mut self) -> Result<()> {
        if !self.in_txn {
            self.conn.execute_batch("BEGIN DEFERRED;")?;
            self.in_txn = true;
        }
        Ok(())
    }

    /// Bumps the write counter and commits once `max_operations` writes
    /// have accumulated since the last commit. On crash, at most
    /// `max_operations - 1` buffered writes are lost — an accepted
    /// durability/performance trade.
    fn note_write(&mut self) -> Result<()> {
        self.operations += 1;
        if self.operations % self.max_operations == 0 {
            self.flush()?;
        }
        Ok(())
    }

    /// Forces a commit of any buffered writes. Called on explicit
    /// shutdown (including after SIGINT) so a graceful exit never loses
    /// data regardless of where the write counter sits.
    pub fn flush(&mut self) -> Result<()> {
        if self.in_txn {
            self.conn.execute_batch("COMMIT;")?;
            self.in_txn = false;
        }
        Ok(())
    }

    /// Compares against `Local::now()`, not UTC, because the `updated`
    /// column is populated by SQLite's `datetime('now','localtime')` and
    /// carries no timezone offset of its own.
    fn is_fresh(&self, updated: &str) -> bool {
        let Some(expires) = self.expires else { return true };
        let Ok(updated) = NaiveDateTime::parse_from_str(updated, "%Y-%m-%d %H:%M:%S%.f") else {
            return true;
        };
        Local::now().naive_local().signed_duration_since(updated) < expires
    }

    /// Treats stale entries as absent.
    pub fn contains(&mut self, key: &str) -> Result<bool> {
        self.begin_if_needed()?;
        let row: Option<String> = self
            .conn
            .query_row("SELECT updated FROM cache WHERE key = ?1;", params![key], |r| r.get(0))
            .optional()?;
        Ok(row.is_some_and(|updated| self.is_fresh(&updated)))
    }

    /// Fails with `CrawlError::Store` if the key is missing or stale;
    /// callers that want "not cached" as a non-error should call
    /// `contains` first.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Result<T> {
        self.begin_if_needed()?;
        let row: Option<(Vec<u8>, String)> = self
            .conn
            .query_row(
                "SELECT value, updated FROM cache WHERE key = ?1;",
                params![key],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;
        let Some((compressed, updated)) = row else {
            return Err(CrawlError::Store(format!("key '{key}' does not exist")));
        };
        if !self.is_fresh(&updated) {
            return Err(CrawlError::Store(format!("key '{key}' is stale")));
        }
        deserialize(&compressed)
    }

    pub fn put<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        self.begin_if_needed()?;
        let blob = serialize(value, self.compress_level)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO cache (key, value, updated) VALUES (?1, ?2, datetime('now','localtime'));",
            params![key, blob],
        )?;
        debug!("stored key '{}' ({} bytes compressed)", key, blob.len());
        self.note_write()
    }

    pub fn del(&mut self, key: &str) -> Result<()> {
        self.begin_if_needed()?;
        self.conn.execute("DELETE FROM cache WHERE key = ?1;", params![key])?;
        self.note_write()
    }

    pub fn iter_keys(&mut self) -> Result<Vec<String>> {
        self.begin_if_needed()?;
        let mut stmt = self.conn.prepare("SELECT key FROM cache;")?;
        let keys = stmt
            .query_map([], |r| r.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(keys)
    }

    pub fn len(&mut self) -> Result<usize> {
        self.begin_if_needed()?;
        let count: i64 = self.conn.query_row("SELECT count(*) FROM cache;", [], |r| r.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.begin_if_needed()?;
        self.conn.execute("DELETE FROM cache;", [])?;
        self.note_write()
    }

    /// Reclaims space from deleted rows. Not part of the hot write path —
    /// callers invoke this during idle maintenance, not per-request.
    pub fn compact(&mut self) -> Result<()> {
        self.flush()?;
        self.conn.execute_batch("VACUUM;")?;
        Ok(())
    }
}

impl Drop for PersistentStore {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

fn serialize<T: Serialize>(value: &T, compress_level: u32) -> Result<Vec<u8>> {
    let bytes = bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| CrawlError::Store(format!("serialize failed: {e}")))?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(compress_level));
    encoder
        .write_all(&bytes)
        .map_err(|e| CrawlError::Store(format!("compress failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| CrawlError::Store(format!("compress failed: {e}")))
}

fn deserialize<T: DeserializeOwned>(compressed: &[u8]) -> Result<T> {
    let mut decoder = GzDecoder::new(compressed);
    let mut bytes = Vec::new();
    decoder
        .read_to_end(&mut bytes)
        .map_err(|e| CrawlError::Store(format!("decompress failed: {e}")))?;
    let (value, _) = bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
        .map_err(|e| CrawlError::Store(format!("deserialize failed: {e}")))?;
    Ok(value)
}
