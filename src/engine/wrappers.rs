//! Typed callables bound to a [`Memo`] context.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::args::Arguments;
use super::memo::Memo;
use crate::ledger::{Trackable, Tracked};
use crate::types::ids::ComputationId;
use crate::{MemoError, MemoResult};

/// A memoized computation.
///
/// Calling it with arguments already seen (same fingerprint) returns the
/// stored result without running the function.
pub struct Memoized<'m, F> {
    memo: &'m Memo,
    id: ComputationId,
    function: F,
}

impl<'m, F> Memoized<'m, F> {
    pub(crate) fn new(memo: &'m Memo, id: ComputationId, function: F) -> Self {
        Self { memo, id, function }
    }

    /// Identity the results are stored under.
    pub fn id(&self) -> ComputationId {
        self.id
    }

    /// Calls the computation through the cache.
    pub fn call<A, R, E>(&self, args: A) -> Result<R, E>
    where
        A: Arguments,
        F: Fn(&A) -> Result<R, E>,
        R: Serialize + DeserializeOwned,
        E: From<MemoError>,
    {
        self.memo
            .invoke(&self.id, &args.describe(), || (self.function)(&args))
    }
}

impl<F> fmt::Debug for Memoized<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized").field("id", &self.id).finish()
    }
}

/// A mutating operation of `T` whose calls are recorded, not executed.
pub struct Mutating<'m, T> {
    memo: &'m Memo,
    operation: &'static str,
    _marker: PhantomData<fn(&T)>,
}

impl<'m, T: Trackable> Mutating<'m, T> {
    pub(crate) fn new(memo: &'m Memo, operation: &'static str) -> Self {
        Self {
            memo,
            operation,
            _marker: PhantomData,
        }
    }

    /// Operation name.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Records the operation on `target` with `args`.
    ///
    /// `args` is a tuple of references, like the arguments of a memoized
    /// call. Each element is signed through the resolver and serialized to
    /// JSON for replay; a tracked element is replayed and captured by value.
    pub fn call<A>(&self, target: &Tracked<T>, args: A) -> MemoResult<()>
    where
        A: Arguments + Serialize,
    {
        self.memo.record_args(target, self.operation, &args)
    }
}

impl<T> fmt::Debug for Mutating<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutating")
            .field("operation", &self.operation)
            .finish()
    }
}

/// A function that needs the real state of its tracked arguments.
///
/// Pending mutations of every tracked argument are replayed before the
/// function runs. The result is not cached.
pub struct Forcing<'m, F> {
    memo: &'m Memo,
    function: F,
}

impl<'m, F> Forcing<'m, F> {
    pub(crate) fn new(memo: &'m Memo, function: F) -> Self {
        Self { memo, function }
    }

    /// Replays tracked arguments, then calls the function.
    pub fn call<A, R, E>(&self, args: A) -> Result<R, E>
    where
        A: Arguments,
        F: Fn(&A) -> Result<R, E>,
        E: From<MemoError>,
    {
        self.memo.realize_args(&args.describe())?;
        (self.function)(&args)
    }
}

impl<F> fmt::Debug for Forcing<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Forcing").finish_non_exhaustive()
    }
}
