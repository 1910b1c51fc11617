//! Identities used in fingerprints and ledgers.

use std::fmt;

use uuid::Uuid;

/// Identity of a memoized computation: defining module plus qualified name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComputationId {
    module: &'static str,
    name: &'static str,
}

impl ComputationId {
    /// Creates an identity from a module path and a qualified name.
    pub const fn new(module: &'static str, name: &'static str) -> Self {
        Self { module, name }
    }

    /// Defining module path.
    pub fn module(&self) -> &'static str {
        self.module
    }

    /// Qualified name inside the module.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for ComputationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.name)
    }
}

/// Builds a [`ComputationId`] for `name` in the calling module.
///
/// ```
/// let id = lazymemo::computation!("Sum::get_value");
/// assert_eq!(id.name(), "Sum::get_value");
/// ```
#[macro_export]
macro_rules! computation {
    ($name:expr) => {
        $crate::ComputationId::new(module_path!(), $name)
    };
}

/// Identity of a tracked class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(&'static str);

impl ClassId {
    /// Identity of `T`, its fully qualified type path.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(std::any::type_name::<T>())
    }

    /// Identity from an explicit name.
    pub const fn named(name: &'static str) -> Self {
        Self(name)
    }

    /// Identity as text.
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Stable surrogate handle of a tracked object.
///
/// Assigned once, at first tracking, and never reused for another object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackHandle(Uuid);

impl TrackHandle {
    /// Issues a new handle.
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TrackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
