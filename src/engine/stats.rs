//! Engine counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of engine activity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoStats {
    /// Calls answered from the store.
    pub hits: u64,

    /// Calls that ran the real computation.
    pub misses: u64,

    /// Mutating calls recorded.
    pub recorded_calls: u64,

    /// Recorded calls applied to real state.
    pub replayed_calls: u64,

    /// Objects with a live ledger.
    pub tracked_objects: usize,
}

impl MemoStats {
    /// Fraction of memoized calls answered from the store.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    recorded: AtomicU64,
    replayed: AtomicU64,
}

impl Counters {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn recorded(&self) {
        self.recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn replayed(&self, calls: usize) {
        self.replayed.fetch_add(calls as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, tracked_objects: usize) -> MemoStats {
        MemoStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            recorded_calls: self.recorded.load(Ordering::Relaxed),
            replayed_calls: self.replayed.load(Ordering::Relaxed),
            tracked_objects,
        }
    }
}
