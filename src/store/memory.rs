//! Process-local store.

use std::collections::HashMap;

use super::{CacheEntry, ComputationCount, PersistentStore};
use crate::MemoResult;

/// `HashMap`-backed store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, CacheEntry>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&mut self, key: &str) -> MemoResult<Option<String>> {
        Ok(self.entries.get(key).map(|e| e.value.clone()))
    }

    fn contains(&mut self, key: &str) -> MemoResult<bool> {
        Ok(self.entries.contains_key(key))
    }

    fn insert(&mut self, entry: CacheEntry) -> MemoResult<bool> {
        if self.entries.contains_key(&entry.key) {
            return Ok(false);
        }
        self.entries.insert(entry.key.clone(), entry);
        Ok(true)
    }

    fn len(&self) -> MemoResult<usize> {
        Ok(self.entries.len())
    }

    fn entries(&self, computation: Option<&str>, limit: usize) -> MemoResult<Vec<CacheEntry>> {
        let mut entries: Vec<CacheEntry> = self
            .entries
            .values()
            .filter(|e| computation.map_or(true, |c| e.computation == c))
            .cloned()
            .collect();

        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.key.cmp(&b.key))
        });
        entries.truncate(limit);
        Ok(entries)
    }

    fn computations(&self) -> MemoResult<Vec<ComputationCount>> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for entry in self.entries.values() {
            *counts.entry(entry.computation.as_str()).or_default() += 1;
        }

        let mut counts: Vec<ComputationCount> = counts
            .into_iter()
            .map(|(computation, entries)| ComputationCount {
                computation: computation.to_string(),
                entries,
            })
            .collect();
        counts.sort_by(|a, b| {
            b.entries
                .cmp(&a.entries)
                .then_with(|| a.computation.cmp(&b.computation))
        });
        Ok(counts)
    }

    fn purge(&mut self, computation: &str) -> MemoResult<usize> {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.computation != computation);
        Ok(before - self.entries.len())
    }

    fn clear(&mut self) -> MemoResult<()> {
        self.entries.clear();
        Ok(())
    }

    fn flush(&mut self) -> MemoResult<()> {
        Ok(())
    }
}
