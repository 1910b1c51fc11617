//! Tracked objects.

use std::cell::{OnceCell, Ref, RefCell};
use std::fmt;
use std::sync::{Arc, Weak};

use serde::{Serialize, Serializer};

use super::call::RecordedCall;
use super::mutation::MutationLedger;
use crate::signature::{ArgKind, Argument};
use crate::types::ids::{ClassId, TrackHandle};
use crate::{MemoError, MemoResult};

/// A class whose mutations can be deferred.
///
/// Mutating operations are dispatched through [`Trackable::apply`] from a fixed
/// table, [`Trackable::OPERATIONS`]; a call naming anything else is rejected
/// before it is recorded.
pub trait Trackable: 'static {
    /// Names of the mutating operations `apply` understands.
    const OPERATIONS: &'static [&'static str];

    /// Applies one recorded call to the real state.
    fn apply(&mut self, call: &RecordedCall) -> MemoResult<()>;

    /// Signature of the initial state, captured when the object is first
    /// tracked. Defaults to empty: objects are then told apart by their
    /// mutation history only.
    fn seed_signature(&self) -> String {
        String::new()
    }

    /// Class identity used for registration.
    fn class_id() -> ClassId
    where
        Self: Sized,
    {
        ClassId::of::<Self>()
    }

    /// Whether `operation` is in the dispatch table.
    fn supports(operation: &str) -> bool
    where
        Self: Sized,
    {
        Self::OPERATIONS.iter().any(|op| *op == operation)
    }
}

/// Object-safe view of a tracked object, used by the resolver and the engine.
pub trait TrackedValue {
    /// Class identity.
    fn class_id(&self) -> ClassId;

    /// Handle, assigning one on first use.
    fn handle(&self) -> TrackHandle;

    /// Handle, if the object was ever tracked.
    fn existing_handle(&self) -> Option<TrackHandle>;

    /// Liveness token; dead once the object is dropped.
    fn owner(&self) -> Weak<()>;

    /// Signature of the current real state's seed.
    fn seed_signature(&self) -> MemoResult<String>;

    /// Replays `ledger` into the real state.
    fn replay(&self, ledger: &mut MutationLedger) -> MemoResult<usize>;
}

/// Real state of a tracked object plus its surrogate handle.
///
/// The state may lag behind recorded mutations until the engine replays them;
/// read it through [`crate::Memo::realize`] unless that lag is acceptable.
pub struct Tracked<T> {
    state: RefCell<T>,
    handle: OnceCell<TrackHandle>,
    alive: Arc<()>,
}

impl<T: Trackable> Tracked<T> {
    /// Wraps `value`. A handle is only assigned once the object is tracked.
    pub fn new(value: T) -> Self {
        Self {
            state: RefCell::new(value),
            handle: OnceCell::new(),
            alive: Arc::new(()),
        }
    }

    /// Handle, if the object was tracked already.
    pub fn handle(&self) -> Option<TrackHandle> {
        self.handle.get().copied()
    }

    /// Borrows the real state as it is, without replaying pending mutations.
    pub fn peek(&self) -> MemoResult<Ref<'_, T>> {
        self.state
            .try_borrow()
            .map_err(|_| MemoError::StateBorrowed(T::class_id().to_string()))
    }

    pub(crate) fn into_state(self) -> T {
        self.state.into_inner()
    }
}

impl<T: Trackable> TrackedValue for Tracked<T> {
    fn class_id(&self) -> ClassId {
        T::class_id()
    }

    fn handle(&self) -> TrackHandle {
        *self.handle.get_or_init(TrackHandle::fresh)
    }

    fn existing_handle(&self) -> Option<TrackHandle> {
        self.handle.get().copied()
    }

    fn owner(&self) -> Weak<()> {
        Arc::downgrade(&self.alive)
    }

    fn seed_signature(&self) -> MemoResult<String> {
        Ok(self.peek()?.seed_signature())
    }

    fn replay(&self, ledger: &mut MutationLedger) -> MemoResult<usize> {
        if ledger.is_clean() {
            return Ok(0);
        }

        let mut state = self
            .state
            .try_borrow_mut()
            .map_err(|_| MemoError::StateBorrowed(T::class_id().to_string()))?;
        ledger.replay(|call| state.apply(call))
    }
}

impl<T: Trackable> Argument for Tracked<T> {
    fn kind(&self) -> ArgKind<'_> {
        ArgKind::Tracked(self)
    }
}

/// Serializes the real state as it is. Pending mutations are not replayed.
impl<T: Trackable + Serialize> Serialize for Tracked<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let state = self.peek().map_err(serde::ser::Error::custom)?;
        state.serialize(serializer)
    }
}

impl<T: fmt::Debug> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("state", &self.state)
            .field("handle", &self.handle.get())
            .finish()
    }
}
