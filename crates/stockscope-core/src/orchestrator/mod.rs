//! # Orchestrators
//!
//! Stateful coordinators deciding when data is fetched and committed.
//!
//! | Orchestrator | Inputs | Committed results |
//! |--------------|--------|-------------------|
//! | [`QuoteOrchestrator`] | security, adjustment mode, candle and week ranges | metadata, daily bars, weekly bars |
//! | [`StatementOrchestrator`] | security, date range, fiscal period | date-interval and quarter bundles |
//!
//! State sits behind a `std::sync::Mutex` that is never held across an
//! `.await`; callers read it through `snapshot()` at any time, including
//! while a fetch is pending. Every fetch captures the selection
//! [`Generation`](crate::Generation) at issue time and its result is
//! dropped if the generation moved on in the meantime.

mod quote;
mod statement;

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

pub use quote::{QuoteOrchestrator, QuoteState};
pub use statement::{StatementOrchestrator, StatementState};

use crate::config::AnalysisContext;
use crate::RangeViolation;

/// How an orchestrator action ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "violation", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Results were stored.
    Committed,
    /// Input broke a range rule; nothing was fetched.
    Rejected(RangeViolation),
    /// A newer selection took over while the fetch was in flight.
    Superseded,
    /// Selection was removed; results were cleared without fetching.
    Cleared,
    /// The value was already set; nothing to do.
    Unchanged,
}

impl FetchOutcome {
    pub const fn is_committed(self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// Hands the violation's message to the notifier and returns it.
pub(crate) fn notify_violation(context: &AnalysisContext, violation: RangeViolation) -> RangeViolation {
    tracing::debug!(code = violation.code(), "range rejected");
    context.notifier().notify(&violation.to_string());
    violation
}

pub(crate) fn lock<S>(state: &Mutex<S>) -> MutexGuard<'_, S> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs `reset` against the guarded state when dropped, so flags are
/// restored on success, failure and cancellation alike.
pub(crate) struct ResetOnDrop<'a, S, F>
where
    F: FnMut(&mut S),
{
    state: &'a Mutex<S>,
    reset: F,
}

impl<'a, S, F> ResetOnDrop<'a, S, F>
where
    F: FnMut(&mut S),
{
    pub(crate) fn new(state: &'a Mutex<S>, reset: F) -> Self {
        Self { state, reset }
    }
}

impl<S, F> Drop for ResetOnDrop<'_, S, F>
where
    F: FnMut(&mut S),
{
    fn drop(&mut self) {
        let mut state = lock(self.state);
        (self.reset)(&mut *state);
    }
}
