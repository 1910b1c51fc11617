//! Recorded mutating calls.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tracked::Trackable;
use crate::{MemoError, MemoResult};

/// A deferred mutating call: operation name plus its arguments.
///
/// Arguments are kept as JSON values so the call can be signed without
/// touching the target and decoded again when it is replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedCall {
    operation: String,
    args: Vec<Value>,
}

impl RecordedCall {
    /// Creates a call from already encoded arguments.
    pub fn new(operation: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            operation: operation.into(),
            args,
        }
    }

    /// Creates a call from a tuple of arguments.
    ///
    /// `()` means no arguments and a tuple is split into one argument per
    /// element. Any other value is taken as the single argument, except that a
    /// bare sequence is split like a tuple; wrap it as `(vec,)` to pass it whole.
    pub fn from_args<A: Serialize>(operation: impl Into<String>, args: A) -> MemoResult<Self> {
        let args = match serde_json::to_value(args)? {
            Value::Null => Vec::new(),
            Value::Array(items) => items,
            single => vec![single],
        };
        Ok(Self::new(operation, args))
    }

    /// Operation name.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Encoded arguments.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Decodes argument `index`.
    pub fn arg<T: DeserializeOwned>(&self, index: usize) -> MemoResult<T> {
        let value = self
            .args
            .get(index)
            .ok_or_else(|| MemoError::InvalidArgument {
                operation: self.operation.clone(),
                index,
                reason: format!("only {} argument(s) recorded", self.args.len()),
            })?;

        serde_json::from_value(value.clone()).map_err(|e| MemoError::InvalidArgument {
            operation: self.operation.clone(),
            index,
            reason: e.to_string(),
        })
    }

    /// Error for a call that `T` has no dispatch entry for.
    pub fn unsupported<T: Trackable>(&self) -> MemoError {
        MemoError::UnknownOperation {
            class: T::class_id().to_string(),
            operation: self.operation.clone(),
        }
    }
}
