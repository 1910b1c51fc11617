//! SQLite-backed persistent store.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use super::{CacheEntry, ComputationCount, PersistentStore};
use crate::MemoResult;

/// Single-table SQLite store.
///
/// Every write is its own implicit transaction, so an entry is durable as
/// soon as [`PersistentStore::insert`] returns.
pub struct SqliteStore {
    conn: Connection,
    path: PathBuf,
}

impl SqliteStore {
    /// Opens or creates the store at `path`.
    pub fn open(path: &Path) -> MemoResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                key TEXT PRIMARY KEY,
                computation TEXT NOT NULL,
                value TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_entries_computation ON entries(computation);
        "#,
        )?;

        tracing::info!(path = %path.display(), "Opened sqlite store");

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<CacheEntry> {
        Ok(CacheEntry {
            key: row.get(0)?,
            computation: row.get(1)?,
            value: row.get(2)?,
            created_at: row.get::<_, String>(3)?.parse::<DateTime<Utc>>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e))
            })?,
        })
    }
}

impl PersistentStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn get(&mut self, key: &str) -> MemoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM entries WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn contains(&mut self, key: &str) -> MemoResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE key = ?",
            params![key],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn insert(&mut self, entry: CacheEntry) -> MemoResult<bool> {
        let written = self.conn.execute(
            "INSERT OR IGNORE INTO entries (key, computation, value, created_at)
             VALUES (?, ?, ?, ?)",
            params![
                entry.key,
                entry.computation,
                entry.value,
                entry.created_at.to_rfc3339()
            ],
        )?;
        Ok(written > 0)
    }

    fn len(&self) -> MemoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn entries(&self, computation: Option<&str>, limit: usize) -> MemoResult<Vec<CacheEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT key, computation, value, created_at
             FROM entries
             WHERE (?1 IS NULL OR computation = ?1)
             ORDER BY created_at DESC, key
             LIMIT ?2",
        )?;

        let entries = stmt
            .query_map(params![computation, limit as i64], Self::row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn computations(&self) -> MemoResult<Vec<ComputationCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT computation, COUNT(*) as count
             FROM entries
             GROUP BY computation
             ORDER BY count DESC, computation",
        )?;

        let counts = stmt
            .query_map([], |row| {
                Ok(ComputationCount {
                    computation: row.get(0)?,
                    entries: row.get::<_, i64>(1)? as usize,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    fn purge(&mut self, computation: &str) -> MemoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM entries WHERE computation = ?",
            params![computation],
        )?;
        Ok(removed)
    }

    fn clear(&mut self) -> MemoResult<()> {
        self.conn.execute("DELETE FROM entries", [])?;
        Ok(())
    }

    fn flush(&mut self) -> MemoResult<()> {
        // Autocommit mode: nothing is buffered on our side.
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }
}
