//! # lazymemo
//!
//! Persistent memoization with lazily replayed mutations.
//!
//! A memoized computation is stored under a fingerprint of its identity and
//! arguments, so repeated calls, across process restarts, return the stored
//! result without running the computation again. Mutations on tracked objects
//! are recorded instead of executed; a tracked object's signature is derived
//! from its mutation history, and the recorded calls are replayed only when
//! the real state is needed.
//!
//! ## Modules
//!
//! - [`engine`] - Memo context, memoized, mutating and forcing wrappers
//! - [`ledger`] - Mutation ledgers and tracked objects
//! - [`signature`] - Argument signatures and call fingerprints
//! - [`store`] - Persistent store backends
//! - [`types`] - Shared types
//! - [`cli`] - Command-line interface (feature `cli`)
//!
//! ## Example
//!
//! ```
//! use lazymemo::{computation, Memo, MemoResult};
//!
//! let memo = Memo::in_memory();
//! let square = memo.memoize(computation!("square"), |&(x,): &(&i64,)| -> MemoResult<i64> {
//!     Ok(x * x)
//! });
//!
//! assert_eq!(square.call((&3,))?, 9);
//! assert_eq!(square.call((&3,))?, 9);
//! assert_eq!(memo.stats().hits, 1);
//! # Ok::<(), lazymemo::MemoError>(())
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod engine;
pub mod ledger;
pub mod signature;
pub mod store;
pub mod types;

pub use engine::{Arguments, CallArgs, Forcing, Memo, MemoStats, Memoized, Mutating};
pub use ledger::{MutationLedger, RecordedCall, Trackable, Tracked};
pub use signature::{Argument, Fingerprint, Signable, Structural, Textual};
pub use store::PersistentStore;
pub use types::config::Config;
pub use types::errors::{MemoError, MemoResult};
pub use types::ids::{ClassId, ComputationId, TrackHandle};
