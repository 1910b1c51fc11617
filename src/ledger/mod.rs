//! Deferred mutations on tracked objects.
//!
//! A mutating call on a tracked object is not executed. It is appended to the
//! object's [`MutationLedger`], which folds the call into the object's
//! signature and keeps it pending until something needs the real state.
//!
//! ## Components
//!
//! - **RecordedCall**: operation name plus JSON-encoded arguments
//! - **MutationLedger**: pending calls plus the accumulated history signature
//! - **Tracked / Trackable**: real state, surrogate handle and dispatch table
//! - **ClassRegistry / LedgerTable**: registered classes and live ledgers

mod call;
mod mutation;
mod registry;
mod tracked;

pub use call::RecordedCall;
pub use mutation::MutationLedger;
pub use registry::{ClassRegistry, LedgerTable};
pub use tracked::{Trackable, Tracked, TrackedValue};
