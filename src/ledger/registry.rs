//! Tracked-class registry and the ledger table.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Weak;

use super::mutation::MutationLedger;
use super::tracked::TrackedValue;
use crate::types::ids::{ClassId, TrackHandle};
use crate::MemoResult;

/// Classes opted into tracking.
#[derive(Debug, Default, Clone)]
pub struct ClassRegistry {
    classes: HashSet<ClassId>,
}

impl ClassRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `class`. Returns `false` if it was registered already.
    pub fn register(&mut self, class: ClassId) -> bool {
        self.classes.insert(class)
    }

    /// Whether `class` is registered.
    pub fn contains(&self, class: ClassId) -> bool {
        self.classes.contains(&class)
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no class is registered.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Smallest table size at which a new entry triggers a prune.
const PRUNE_FLOOR: usize = 64;

#[derive(Debug)]
struct Slot {
    ledger: MutationLedger,
    owner: Weak<()>,
}

impl Slot {
    fn is_live(&self) -> bool {
        self.owner.strong_count() > 0
    }
}

/// Mutation ledgers keyed by surrogate handle.
///
/// Each ledger holds a weak reference to its object. Ledgers whose object was
/// dropped are pruned when the table grows past its threshold, and on demand.
#[derive(Debug)]
pub struct LedgerTable {
    ledgers: HashMap<TrackHandle, Slot>,
    prune_at: usize,
}

impl Default for LedgerTable {
    fn default() -> Self {
        Self {
            ledgers: HashMap::new(),
            prune_at: PRUNE_FLOOR,
        }
    }
}

impl LedgerTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger of `tracked`, created on first use.
    pub fn ensure(&mut self, tracked: &dyn TrackedValue) -> MemoResult<&mut MutationLedger> {
        let handle = tracked.handle();
        if !self.ledgers.contains_key(&handle) && self.ledgers.len() >= self.prune_at {
            self.prune();
            self.prune_at = (self.ledgers.len() * 2).max(PRUNE_FLOOR);
        }

        match self.ledgers.entry(handle) {
            Entry::Occupied(entry) => Ok(&mut entry.into_mut().ledger),
            Entry::Vacant(entry) => {
                let seed = tracked.seed_signature()?;
                tracing::trace!(class = %tracked.class_id(), handle = %handle, "Tracking new object");
                let slot = entry.insert(Slot {
                    ledger: MutationLedger::new(tracked.class_id(), &seed),
                    owner: tracked.owner(),
                });
                Ok(&mut slot.ledger)
            }
        }
    }

    /// Ledger for `handle`, if any.
    pub fn get(&self, handle: TrackHandle) -> Option<&MutationLedger> {
        self.ledgers.get(&handle).map(|slot| &slot.ledger)
    }

    /// Puts `ledger` back as the ledger of `tracked`.
    pub fn insert(&mut self, tracked: &dyn TrackedValue, ledger: MutationLedger) {
        let slot = Slot {
            ledger,
            owner: tracked.owner(),
        };
        self.ledgers.insert(tracked.handle(), slot);
    }

    /// Drops the ledger for `handle`.
    pub fn remove(&mut self, handle: TrackHandle) -> Option<MutationLedger> {
        self.ledgers.remove(&handle).map(|slot| slot.ledger)
    }

    /// Drops every ledger whose object no longer exists. Returns how many went.
    pub fn prune(&mut self) -> usize {
        let before = self.ledgers.len();
        self.ledgers.retain(|_, slot| slot.is_live());
        let pruned = before - self.ledgers.len();
        if pruned > 0 {
            tracing::trace!(pruned, remaining = self.ledgers.len(), "Pruned dead ledgers");
        }
        pruned
    }

    /// Number of ledgers held, including any not yet pruned.
    pub fn len(&self) -> usize {
        self.ledgers.len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }
}
