//! Persistent store for memoized results.
//!
//! The engine sees the store as an opaque durable map from string keys to
//! serialized results. Entries are immutable once written: [`PersistentStore::insert`]
//! never replaces an existing key.
//!
//! ## Backends
//!
//! - [`SqliteStore`]: single-table SQLite file (feature `sqlite`)
//! - [`MemoryStore`]: process-local map
//! - [`HotStore`]: LRU read cache in front of any other backend

mod hot;
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use hot::HotStore;
pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::config::{StoreBackend, StoreConfig};
use crate::MemoResult;

/// A stored result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Store key derived from the call fingerprint.
    pub key: String,

    /// Display form of the computation identity, for inspection only.
    pub computation: String,

    /// Serialized result (JSON).
    pub value: String,

    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(
        key: impl Into<String>,
        computation: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            computation: computation.into(),
            value: value.into(),
            created_at: Utc::now(),
        }
    }
}

/// Number of entries stored for one computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationCount {
    pub computation: String,
    pub entries: usize,
}

/// Durable key → serialized-result mapping.
pub trait PersistentStore {
    /// Backend name, for logs.
    fn name(&self) -> &str;

    /// Returns the serialized result stored under `key`.
    fn get(&mut self, key: &str) -> MemoResult<Option<String>>;

    /// Checks whether `key` is present.
    fn contains(&mut self, key: &str) -> MemoResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Writes `entry` unless its key already exists.
    ///
    /// Returns whether the entry was written.
    fn insert(&mut self, entry: CacheEntry) -> MemoResult<bool>;

    /// Number of stored entries.
    fn len(&self) -> MemoResult<usize>;

    /// Whether the store holds no entries.
    fn is_empty(&self) -> MemoResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Lists entries, newest first, optionally for one computation only.
    fn entries(&self, computation: Option<&str>, limit: usize) -> MemoResult<Vec<CacheEntry>>;

    /// Entry counts per computation, largest first.
    fn computations(&self) -> MemoResult<Vec<ComputationCount>>;

    /// Removes every entry of `computation`, returning how many were removed.
    fn purge(&mut self, computation: &str) -> MemoResult<usize>;

    /// Removes every entry.
    fn clear(&mut self) -> MemoResult<()>;

    /// Makes pending writes durable.
    fn flush(&mut self) -> MemoResult<()>;
}

/// Opens the backend described by `config`.
pub fn open_store(config: &StoreConfig) -> MemoResult<Box<dyn PersistentStore>> {
    let store: Box<dyn PersistentStore> = match config.backend {
        #[cfg(feature = "sqlite")]
        StoreBackend::Sqlite => Box::new(SqliteStore::open(&config.path)?),
        #[cfg(not(feature = "sqlite"))]
        StoreBackend::Sqlite => {
            return Err(crate::MemoError::config(
                "sqlite backend requested but the `sqlite` feature is disabled",
            ))
        }
        StoreBackend::Memory => Box::new(MemoryStore::new()),
    };

    if config.hot_capacity == 0 {
        return Ok(store);
    }

    Ok(Box::new(HotStore::new(store, config.hot_capacity)))
}

impl<S: PersistentStore + ?Sized> PersistentStore for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get(&mut self, key: &str) -> MemoResult<Option<String>> {
        (**self).get(key)
    }

    fn contains(&mut self, key: &str) -> MemoResult<bool> {
        (**self).contains(key)
    }

    fn insert(&mut self, entry: CacheEntry) -> MemoResult<bool> {
        (**self).insert(entry)
    }

    fn len(&self) -> MemoResult<usize> {
        (**self).len()
    }

    fn entries(&self, computation: Option<&str>, limit: usize) -> MemoResult<Vec<CacheEntry>> {
        (**self).entries(computation, limit)
    }

    fn computations(&self) -> MemoResult<Vec<ComputationCount>> {
        (**self).computations()
    }

    fn purge(&mut self, computation: &str) -> MemoResult<usize> {
        (**self).purge(computation)
    }

    fn clear(&mut self) -> MemoResult<()> {
        (**self).clear()
    }

    fn flush(&mut self) -> MemoResult<()> {
        (**self).flush()
    }
}
