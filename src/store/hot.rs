//! LRU read cache in front of a persistent store.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;

use super::{CacheEntry, ComputationCount, PersistentStore};
use crate::MemoResult;

/// Statistics of the read cache.
#[derive(Debug, Clone, Default)]
pub struct HotStats {
    /// Current number of cached values.
    pub size: usize,

    /// Maximum capacity.
    pub capacity: usize,

    /// Reads served from memory.
    pub hits: u64,

    /// Reads forwarded to the inner store.
    pub misses: u64,
}

impl HotStats {
    /// Fraction of reads served from memory.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Keeps recently read or written values in memory.
///
/// Writes go to the inner store first; the cache only ever holds values the
/// inner store has accepted.
pub struct HotStore<S> {
    inner: S,
    cache: LruCache<String, String>,
    name: String,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<S: PersistentStore> HotStore<S> {
    /// Wraps `inner` with a cache of `capacity` values.
    pub fn new(inner: S, capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        let name = format!("{}+lru", inner.name());
        Self {
            inner,
            cache: LruCache::new(cap),
            name,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> HotStats {
        HotStats {
            size: self.cache.len(),
            capacity: self.cache.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl<S: PersistentStore> PersistentStore for HotStore<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&mut self, key: &str) -> MemoResult<Option<String>> {
        if let Some(value) = self.cache.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Some(value.clone()));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = self.inner.get(key)?;
        if let Some(value) = &value {
            self.cache.put(key.to_string(), value.clone());
        }
        Ok(value)
    }

    fn contains(&mut self, key: &str) -> MemoResult<bool> {
        if self.cache.contains(key) {
            return Ok(true);
        }
        self.inner.contains(key)
    }

    fn insert(&mut self, entry: CacheEntry) -> MemoResult<bool> {
        let key = entry.key.clone();
        let value = entry.value.clone();

        let written = self.inner.insert(entry)?;
        if written {
            self.cache.put(key, value);
        }
        Ok(written)
    }

    fn len(&self) -> MemoResult<usize> {
        self.inner.len()
    }

    fn entries(&self, computation: Option<&str>, limit: usize) -> MemoResult<Vec<CacheEntry>> {
        self.inner.entries(computation, limit)
    }

    fn computations(&self) -> MemoResult<Vec<ComputationCount>> {
        self.inner.computations()
    }

    fn purge(&mut self, computation: &str) -> MemoResult<usize> {
        // Cached values carry no computation label.
        self.cache.clear();
        self.inner.purge(computation)
    }

    fn clear(&mut self) -> MemoResult<()> {
        self.cache.clear();
        self.inner.clear()
    }

    fn flush(&mut self) -> MemoResult<()> {
        self.inner.flush()
    }
}
