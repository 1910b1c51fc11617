//! Per-object mutation ledger.

use super::call::RecordedCall;
use crate::signature::{push_segment, Signable};
use crate::types::ids::ClassId;
use crate::MemoResult;

/// Deferred mutations of one tracked object.
///
/// `pending` holds calls not yet applied to the real object and is cleared by
/// replay. `accumulated` is the signature of the whole mutation history; it
/// only ever grows and does not depend on whether anything was replayed.
#[derive(Debug, Clone)]
pub struct MutationLedger {
    pending: Vec<RecordedCall>,
    accumulated: String,
    recorded: usize,
}

impl MutationLedger {
    /// Starts a ledger for an object of `class` whose initial state signs as `seed`.
    pub fn new(class: ClassId, seed: &str) -> Self {
        let mut accumulated = String::new();
        push_segment(&mut accumulated, class.as_str());
        push_segment(&mut accumulated, seed);

        Self {
            pending: Vec::new(),
            accumulated,
            recorded: 0,
        }
    }

    /// Appends `call` without applying it, signing each argument by its
    /// encoded JSON value.
    pub fn record(&mut self, call: RecordedCall) {
        let signatures: Vec<String> = call.args().iter().map(Signable::signature).collect();
        self.record_signed(call, &signatures);
    }

    /// Appends `call` without applying it. `signatures` are the already
    /// resolved signatures of its arguments and go into the history as given.
    pub fn record_signed(&mut self, call: RecordedCall, signatures: &[String]) {
        push_segment(&mut self.accumulated, call.operation());
        push_segment(&mut self.accumulated, &signatures.len().to_string());
        for signature in signatures {
            push_segment(&mut self.accumulated, signature);
        }

        self.pending.push(call);
        self.recorded += 1;
    }

    /// Applies pending calls in recorded order, then clears them.
    ///
    /// If `apply` fails, the calls applied so far are dropped from `pending`
    /// and the failing call stays first in line, so nothing is applied twice.
    /// Returns the number of calls applied.
    pub fn replay<F>(&mut self, mut apply: F) -> MemoResult<usize>
    where
        F: FnMut(&RecordedCall) -> MemoResult<()>,
    {
        let mut applied = 0;
        let outcome = self.pending.iter().try_for_each(|call| -> MemoResult<()> {
            apply(call)?;
            applied += 1;
            Ok(())
        });

        self.pending.drain(..applied);
        outcome.map(|()| applied)
    }

    /// Signature of the full mutation history.
    pub fn signature(&self) -> &str {
        &self.accumulated
    }

    /// Calls waiting for replay.
    pub fn pending(&self) -> &[RecordedCall] {
        &self.pending
    }

    /// Number of calls waiting for replay.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Whether real state reflects every recorded call.
    pub fn is_clean(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of calls recorded over the ledger's lifetime.
    pub fn recorded_len(&self) -> usize {
        self.recorded
    }
}
