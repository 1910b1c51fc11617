//! Memoization engine.
//!
//! [`Memo`] ties the pieces together: it resolves argument signatures, builds
//! fingerprints, answers repeated calls from the persistent store and records
//! mutations on tracked objects until something needs their real state.

mod args;
mod memo;
mod stats;
mod wrappers;

pub use args::{Arguments, CallArgs};
pub use memo::Memo;
pub use stats::MemoStats;
pub use wrappers::{Forcing, Memoized, Mutating};
