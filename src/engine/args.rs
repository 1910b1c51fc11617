//! Argument lists of memoized calls.

use std::collections::BTreeMap;
use std::fmt;

use crate::signature::Argument;

/// Arguments of one call: positional values plus keyword values keyed by name.
///
/// Keyword arguments are kept ordered by name, so the order in which they are
/// added does not affect the fingerprint. Adding a name twice keeps the last value.
#[derive(Clone, Default)]
pub struct CallArgs<'a> {
    positional: Vec<&'a dyn Argument>,
    keyword: BTreeMap<&'a str, &'a dyn Argument>,
}

impl<'a> CallArgs<'a> {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: &'a dyn Argument) -> Self {
        self.positional.push(value);
        self
    }

    /// Sets a keyword argument.
    pub fn kwarg(mut self, name: &'a str, value: &'a dyn Argument) -> Self {
        self.keyword.insert(name, value);
        self
    }

    /// Positional arguments in call order.
    pub fn positional(&self) -> &[&'a dyn Argument] {
        &self.positional
    }

    /// Keyword arguments ordered by name.
    pub fn keyword(&self) -> impl Iterator<Item = (&'a str, &'a dyn Argument)> + '_ {
        self.keyword.iter().map(|(name, value)| (*name, *value))
    }

    /// Every argument, positional first.
    pub fn values(&self) -> impl Iterator<Item = &'a dyn Argument> + '_ {
        self.positional
            .iter()
            .copied()
            .chain(self.keyword.values().copied())
    }

    /// Total number of arguments.
    pub fn len(&self) -> usize {
        self.positional.len() + self.keyword.len()
    }

    /// Whether the call has no arguments.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for CallArgs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallArgs")
            .field("positional", &self.positional.len())
            .field("keyword", &self.keyword.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Typed argument lists that can describe themselves as [`CallArgs`].
///
/// Implemented for `()`, tuples of references to [`Argument`]s and
/// [`CallArgs`]. Implement it for a struct to pass keyword arguments to a
/// [`crate::Memoized`] computation.
pub trait Arguments {
    /// The arguments as seen by the engine.
    fn describe(&self) -> CallArgs<'_>;
}

impl Arguments for () {
    fn describe(&self) -> CallArgs<'_> {
        CallArgs::new()
    }
}

impl<'a> Arguments for CallArgs<'a> {
    fn describe(&self) -> CallArgs<'_> {
        self.clone()
    }
}

macro_rules! tuple_arguments {
    ($($name:ident : $idx:tt),+) => {
        impl<'x, $($name: Argument),+> Arguments for ($(&'x $name,)+) {
            fn describe(&self) -> CallArgs<'_> {
                CallArgs::new()$(.arg(self.$idx))+
            }
        }
    };
}

tuple_arguments!(A: 0);
tuple_arguments!(A: 0, B: 1);
tuple_arguments!(A: 0, B: 1, C: 2);
tuple_arguments!(A: 0, B: 1, C: 2, D: 3);
tuple_arguments!(A: 0, B: 1, C: 2, D: 3, E: 4);
tuple_arguments!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
