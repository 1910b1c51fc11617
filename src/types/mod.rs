//! Shared types: identities, errors and configuration.

pub mod config;
pub mod errors;
pub mod ids;

pub use config::{Config, KeyEncoding, StoreBackend, StoreConfig};
pub use errors::{MemoError, MemoResult};
pub use ids::{ClassId, ComputationId, TrackHandle};
