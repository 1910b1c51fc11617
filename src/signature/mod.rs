//! Signature resolution.
//!
//! Every argument of a memoized call is reduced to a canonical string:
//!
//! - tracked objects sign with their ledger's accumulated mutation history
//! - [`Signable`] values sign with their explicit signature
//! - [`Textual`] / [`Structural`] wrappers fall back to a textual form
//!
//! Resolution never replays a ledger. Its only side effect is creating the
//! ledger of a tracked object seen for the first time.

mod fingerprint;
mod signable;

pub use fingerprint::{push_segment, Fingerprint};
pub use signable::{Signable, Structural, Textual};

use std::fmt::Debug;

use serde::Serialize;

use crate::ledger::{ClassRegistry, LedgerTable, TrackedValue};
use crate::{MemoError, MemoResult};

/// How an argument takes part in a fingerprint.
pub enum ArgKind<'a> {
    /// Tracked object, signed by its mutation ledger.
    Tracked(&'a dyn TrackedValue),
    /// Value with an explicit signature.
    Signed(&'a dyn Signable),
    /// Fallback textual form, already rendered.
    Textual(MemoResult<String>),
}

/// A value that can be passed to a memoized computation.
pub trait Argument {
    /// Classifies the value for signature resolution.
    fn kind(&self) -> ArgKind<'_>;
}

impl<S: Signable> Argument for S {
    fn kind(&self) -> ArgKind<'_> {
        ArgKind::Signed(self)
    }
}

impl<T: Debug> Argument for Textual<T> {
    fn kind(&self) -> ArgKind<'_> {
        ArgKind::Textual(Ok(self.repr()))
    }
}

impl<T: Serialize> Argument for Structural<T> {
    fn kind(&self) -> ArgKind<'_> {
        ArgKind::Textual(self.repr())
    }
}

/// Resolves the signature of `arg`.
///
/// A tracked object must belong to a registered class; its ledger is created
/// on first sight.
pub fn resolve(
    arg: &dyn Argument,
    registry: &ClassRegistry,
    ledgers: &mut LedgerTable,
) -> MemoResult<String> {
    match arg.kind() {
        ArgKind::Tracked(tracked) => {
            let class = tracked.class_id();
            if !registry.contains(class) {
                return Err(MemoError::UnregisteredClass(class.to_string()));
            }
            let ledger = ledgers.ensure(tracked)?;
            Ok(ledger.signature().to_string())
        }
        ArgKind::Signed(value) => Ok(value.signature()),
        ArgKind::Textual(repr) => repr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{RecordedCall, Trackable, Tracked};
    use crate::ClassId;

    #[derive(Default)]
    struct Counter {
        count: i64,
    }

    impl Trackable for Counter {
        const OPERATIONS: &'static [&'static str] = &["bump"];

        fn apply(&mut self, call: &RecordedCall) -> MemoResult<()> {
            match call.operation() {
                "bump" => {
                    self.count += 1;
                    Ok(())
                }
                _ => Err(call.unsupported::<Self>()),
            }
        }
    }

    #[test]
    fn test_plain_values() {
        let registry = ClassRegistry::new();
        let mut ledgers = LedgerTable::new();

        assert_eq!(resolve(&7u8, &registry, &mut ledgers).unwrap(), "7");
        assert_eq!(
            resolve(&Textual(vec![(1, 'a')]), &registry, &mut ledgers).unwrap(),
            "[(1, 'a')]"
        );
        assert!(ledgers.is_empty());
    }

    #[test]
    fn test_tracked_creates_ledger_lazily() {
        let mut registry = ClassRegistry::new();
        registry.register(ClassId::of::<Counter>());
        let mut ledgers = LedgerTable::new();
        let counter = Tracked::new(Counter::default());

        assert!(counter.handle().is_none());
        let first = resolve(&counter, &registry, &mut ledgers).unwrap();
        let second = resolve(&counter, &registry, &mut ledgers).unwrap();

        assert_eq!(first, second);
        assert!(counter.handle().is_some());
        assert_eq!(ledgers.len(), 1);
        assert_eq!(counter.peek().unwrap().count, 0);
    }

    #[test]
    fn test_unregistered_class_fails() {
        let registry = ClassRegistry::new();
        let mut ledgers = LedgerTable::new();
        let counter = Tracked::new(Counter::default());

        let err = resolve(&counter, &registry, &mut ledgers).unwrap_err();
        assert!(matches!(err, MemoError::UnregisteredClass(_)));
        assert!(ledgers.is_empty());
    }
}
