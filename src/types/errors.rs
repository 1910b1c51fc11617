//! Error types for lazymemo.

use thiserror::Error;

/// Standard result type for lazymemo.
pub type MemoResult<T> = Result<T, MemoError>;

/// Errors raised by the memoization engine and its collaborators.
///
/// Failures of a memoized computation itself are not represented here: the
/// computation's own error type is handed back to the caller unchanged.
#[derive(Error, Debug)]
pub enum MemoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Persistent store unavailable: {0}")]
    Store(String),

    #[error("Could not resolve argument signature: {0}")]
    SignatureResolution(String),

    #[error("Class '{0}' is not registered for tracking")]
    UnregisteredClass(String),

    #[error("Operation '{operation}' is not a mutating operation of '{class}'")]
    UnknownOperation { class: String, operation: String },

    #[error("Invalid argument {index} for '{operation}': {reason}")]
    InvalidArgument {
        operation: String,
        index: usize,
        reason: String,
    },

    #[error("State of '{0}' is already borrowed")]
    StateBorrowed(String),

    #[error("{0}")]
    Other(String),
}

impl MemoError {
    /// Creates a generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a store error.
    pub fn store<S: Into<String>>(msg: S) -> Self {
        Self::Store(msg.into())
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for MemoError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store(err.to_string())
    }
}
