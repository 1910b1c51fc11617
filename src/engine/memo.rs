//! The memoization context.

use std::cell::{Ref, RefCell};
#[cfg(feature = "sqlite")]
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::args::{Arguments, CallArgs};
use super::stats::{Counters, MemoStats};
use super::wrappers::{Forcing, Memoized, Mutating};
use crate::ledger::{ClassRegistry, LedgerTable, RecordedCall, Trackable, Tracked, TrackedValue};
use crate::signature::{self, push_segment, ArgKind, Argument, Fingerprint};
use crate::store::{self, CacheEntry, MemoryStore, PersistentStore};
use crate::types::config::{Config, KeyEncoding, StoreConfig};
use crate::types::ids::{ClassId, ComputationId};
use crate::{MemoError, MemoResult};

/// Memoization context.
///
/// Owns the persistent store, the tracked-class registry and the ledgers of
/// every tracked object. Wrapped callables borrow it.
///
/// The context is single-threaded (`!Sync`). No interior borrow is held while
/// user code runs, so a memoized computation may call other memoized
/// computations through the same context.
pub struct Memo {
    store: RefCell<Box<dyn PersistentStore>>,
    registry: RefCell<ClassRegistry>,
    ledgers: RefCell<LedgerTable>,
    key_encoding: KeyEncoding,
    counters: Counters,
}

impl Memo {
    /// Creates a context over `store`, hashing fingerprints into keys.
    pub fn with_store(store: Box<dyn PersistentStore>) -> Self {
        Self {
            store: RefCell::new(store),
            registry: RefCell::new(ClassRegistry::new()),
            ledgers: RefCell::new(LedgerTable::new()),
            key_encoding: KeyEncoding::Sha256,
            counters: Counters::default(),
        }
    }

    /// Sets how fingerprints become store keys.
    pub fn key_encoding(mut self, encoding: KeyEncoding) -> Self {
        self.key_encoding = encoding;
        self
    }

    /// Creates a context over a process-local store.
    pub fn in_memory() -> Self {
        Self::with_store(Box::new(MemoryStore::new()))
    }

    /// Opens a context over the sqlite store at `path`.
    #[cfg(feature = "sqlite")]
    pub fn open(path: impl AsRef<Path>) -> MemoResult<Self> {
        Self::from_store_config(&StoreConfig::at(path.as_ref()))
    }

    /// Opens a context as described by `config`.
    pub fn from_config(config: &Config) -> MemoResult<Self> {
        Self::from_store_config(&config.store)
    }

    /// Opens a context over the store described by `config`.
    pub fn from_store_config(config: &StoreConfig) -> MemoResult<Self> {
        let store = store::open_store(config)?;
        tracing::debug!(
            backend = store.name(),
            key_encoding = ?config.key_encoding,
            "Memo context ready"
        );
        Ok(Self::with_store(store).key_encoding(config.key_encoding))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Registration
    // ═══════════════════════════════════════════════════════════════════════

    /// Opts `T` into tracking. Returns `false` if it was registered already.
    pub fn register<T: Trackable>(&self) -> bool {
        self.register_class(T::class_id())
    }

    /// Opts a class into tracking by identity.
    pub fn register_class(&self, class: ClassId) -> bool {
        let added = self.registry.borrow_mut().register(class);
        if added {
            tracing::debug!(class = %class, "Registered tracked class");
        }
        added
    }

    /// Whether `T` is registered.
    pub fn is_registered<T: Trackable>(&self) -> bool {
        self.registry.borrow().contains(T::class_id())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Signatures
    // ═══════════════════════════════════════════════════════════════════════

    /// Resolves the signature of one argument.
    pub fn signature_of(&self, arg: &dyn Argument) -> MemoResult<String> {
        let registry = self.registry.borrow();
        let mut ledgers = self.ledgers.borrow_mut();
        signature::resolve(arg, &registry, &mut ledgers)
    }

    /// Builds the fingerprint of calling `id` with `args`.
    pub fn fingerprint(&self, id: &ComputationId, args: &CallArgs<'_>) -> MemoResult<Fingerprint> {
        let positional = args
            .positional()
            .iter()
            .map(|arg| self.signature_of(*arg))
            .collect::<MemoResult<Vec<_>>>()?;

        let keyword = args
            .keyword()
            .map(|(name, arg)| Ok((name, self.signature_of(arg)?)))
            .collect::<MemoResult<Vec<_>>>()?;

        Ok(Fingerprint::build(id, &positional, &keyword))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Memoized calls
    // ═══════════════════════════════════════════════════════════════════════

    /// Runs `real` through the cache.
    ///
    /// On a hit the stored result is returned and nothing is replayed. On a
    /// miss every tracked argument is replayed, `real` runs, and its result is
    /// stored. An error from `real` is returned unchanged and nothing is stored.
    pub fn invoke<R, E, F>(&self, id: &ComputationId, args: &CallArgs<'_>, real: F) -> Result<R, E>
    where
        R: Serialize + DeserializeOwned,
        E: From<MemoError>,
        F: FnOnce() -> Result<R, E>,
    {
        let key = self.fingerprint(id, args)?.key(self.key_encoding);

        let stored = self.store.borrow_mut().get(&key)?;
        if let Some(stored) = stored {
            self.counters.hit();
            tracing::debug!(computation = %id, key = %key, "Cache hit");
            let result = serde_json::from_str(&stored).map_err(MemoError::from)?;
            return Ok(result);
        }

        self.counters.miss();
        tracing::debug!(computation = %id, key = %key, "Cache miss");

        self.realize_args(args)?;
        let result = real()?;

        let value = serde_json::to_string(&result).map_err(MemoError::from)?;
        let written = self
            .store
            .borrow_mut()
            .insert(CacheEntry::new(key, id.to_string(), value))?;
        if !written {
            tracing::debug!(computation = %id, "Entry already stored, kept existing value");
        }

        Ok(result)
    }

    /// Wraps `function` as a memoized computation named `id`.
    ///
    /// The function receives the arguments passed to [`Memoized::call`]; any
    /// [`crate::Arguments`] type works, so the closure's parameter type must be
    /// spelled out.
    pub fn memoize<F>(&self, id: ComputationId, function: F) -> Memoized<'_, F> {
        Memoized::new(self, id, function)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Mutations
    // ═══════════════════════════════════════════════════════════════════════

    /// Wraps mutating operation `operation` of `T` so calls are recorded.
    pub fn mutating<T: Trackable>(&self, operation: &'static str) -> MemoResult<Mutating<'_, T>> {
        if !T::supports(operation) {
            return Err(MemoError::UnknownOperation {
                class: T::class_id().to_string(),
                operation: operation.to_string(),
            });
        }
        Ok(Mutating::new(self, operation))
    }

    /// Records an already encoded `call` on `target` without applying it.
    /// Arguments are signed by their JSON values.
    pub fn record<T: Trackable>(&self, target: &Tracked<T>, call: RecordedCall) -> MemoResult<()> {
        self.check_recordable::<T>(call.operation())?;
        self.append(target, call, None)
    }

    /// Records `operation` on `target` with typed `args`, without applying it.
    ///
    /// Arguments are signed by the same resolver as memoized calls: a
    /// [`crate::Signable`] value by its own signature, a tracked object by its
    /// mutation history. Tracked arguments are replayed before `args` is
    /// encoded, so the recorded call captures their real state by value.
    pub fn record_args<T, A>(&self, target: &Tracked<T>, operation: &str, args: &A) -> MemoResult<()>
    where
        T: Trackable,
        A: Arguments + Serialize,
    {
        self.check_recordable::<T>(operation)?;

        let described = args.describe();
        let mut signatures = described
            .positional()
            .iter()
            .map(|arg| self.signature_of(*arg))
            .collect::<MemoResult<Vec<_>>>()?;
        for (name, arg) in described.keyword() {
            let mut signature = String::new();
            push_segment(&mut signature, name);
            push_segment(&mut signature, &self.signature_of(arg)?);
            signatures.push(signature);
        }

        self.realize_args(&described)?;
        let call = RecordedCall::from_args(operation, args)?;
        self.append(target, call, Some(signatures))
    }

    fn check_recordable<T: Trackable>(&self, operation: &str) -> MemoResult<()> {
        let class = T::class_id();
        if !self.registry.borrow().contains(class) {
            return Err(MemoError::UnregisteredClass(class.to_string()));
        }
        if !T::supports(operation) {
            return Err(MemoError::UnknownOperation {
                class: class.to_string(),
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    fn append<T: Trackable>(
        &self,
        target: &Tracked<T>,
        call: RecordedCall,
        signatures: Option<Vec<String>>,
    ) -> MemoResult<()> {
        let mut ledgers = self.ledgers.borrow_mut();
        let ledger = ledgers.ensure(target)?;
        tracing::trace!(
            class = %T::class_id(),
            operation = call.operation(),
            pending = ledger.pending_len() + 1,
            "Recorded mutation"
        );
        match signatures {
            Some(signatures) => ledger.record_signed(call, &signatures),
            None => ledger.record(call),
        }
        self.counters.recorded();
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Forcing boundary
    // ═══════════════════════════════════════════════════════════════════════

    /// Wraps `function` so tracked arguments are replayed before it runs.
    /// The result is not cached.
    pub fn forcing<F>(&self, function: F) -> Forcing<'_, F> {
        Forcing::new(self, function)
    }

    /// Replays every tracked argument in `args`. Returns the number of calls applied.
    pub fn realize_args(&self, args: &CallArgs<'_>) -> MemoResult<usize> {
        let mut applied = 0;
        for arg in args.values() {
            if let ArgKind::Tracked(tracked) = arg.kind() {
                applied += self.replay(tracked)?;
            }
        }
        Ok(applied)
    }

    /// Replays `target` and borrows its up-to-date state.
    pub fn realize<'t, T: Trackable>(&self, target: &'t Tracked<T>) -> MemoResult<Ref<'t, T>> {
        self.replay(target)?;
        target.peek()
    }

    /// Number of calls on `target` waiting for replay.
    pub fn pending_len<T: Trackable>(&self, target: &Tracked<T>) -> usize {
        target
            .handle()
            .and_then(|handle| {
                self.ledgers
                    .borrow()
                    .get(handle)
                    .map(|ledger| ledger.pending_len())
            })
            .unwrap_or(0)
    }

    /// Replays `target`, forgets its ledger and returns the real value.
    pub fn untrack<T: Trackable>(&self, target: Tracked<T>) -> MemoResult<T> {
        self.replay(&target)?;
        if let Some(handle) = target.handle() {
            self.ledgers.borrow_mut().remove(handle);
        }
        Ok(target.into_state())
    }

    fn replay(&self, tracked: &dyn TrackedValue) -> MemoResult<usize> {
        let Some(handle) = tracked.existing_handle() else {
            return Ok(0);
        };

        // Detached while `apply` runs, so user code may re-enter the context.
        let Some(mut ledger) = self.ledgers.borrow_mut().remove(handle) else {
            return Ok(0);
        };
        let outcome = tracked.replay(&mut ledger);
        self.ledgers.borrow_mut().insert(tracked, ledger);

        let applied = outcome?;
        if applied > 0 {
            self.counters.replayed(applied);
            tracing::trace!(class = %tracked.class_id(), applied, "Replayed mutations");
        }
        Ok(applied)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    /// Returns engine statistics. Ledgers of dropped objects are pruned first.
    pub fn stats(&self) -> MemoStats {
        let mut ledgers = self.ledgers.borrow_mut();
        ledgers.prune();
        self.counters.snapshot(ledgers.len())
    }

    /// Number of stored results.
    pub fn stored_len(&self) -> MemoResult<usize> {
        self.store.borrow().len()
    }

    /// Makes stored results durable.
    pub fn flush(&self) -> MemoResult<()> {
        self.store.borrow_mut().flush()
    }

    /// Flushes and releases the store.
    pub fn close(self) -> MemoResult<()> {
        self.flush()?;
        tracing::debug!(stats = ?self.stats(), "Memo context closed");
        Ok(())
    }
}
