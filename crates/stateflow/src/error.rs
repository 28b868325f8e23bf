//! Error types for the store.
//!
//! Reducer failures are synchronous and reach the `dispatch` caller. Effect
//! failures never do: they are caught at the task boundary and either
//! dropped or mapped to a failure action by the registration.

use std::time::Duration;

use thiserror::Error;

/// A reducer could not legally handle an action.
///
/// Returning this from a reducer aborts the dispatch cycle: state stays
/// unchanged and no subscriber or effect observes the action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReducerError {
    #[error("action {action} rejected: {reason}")]
    Rejected { action: String, reason: String },

    #[error("{field} overflowed")]
    Overflow { field: &'static str },
}

impl ReducerError {
    pub fn rejected(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            action: action.into(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by [`Store`](crate::Store) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Reducer(#[from] ReducerError),

    #[error("store has been shut down")]
    ShutDown,

    #[error("effects are registered but no tokio runtime is available")]
    NoRuntime,
}

/// A side effect failed at its invocation boundary.
#[derive(Debug, Error)]
pub enum EffectError {
    #[error("effect failed: {0:#}")]
    Failed(#[source] anyhow::Error),

    #[error("effect timed out after {0:?}")]
    TimedOut(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reducer_error_converts_into_store_error() {
        let err: StoreError = ReducerError::Overflow { field: "counter" }.into();
        assert!(matches!(err, StoreError::Reducer(ReducerError::Overflow { .. })));
        assert_eq!(err.to_string(), "counter overflowed");
    }

    #[test]
    fn effect_error_keeps_the_cause_chain() {
        let cause = anyhow::anyhow!("connection reset").context("fetch slot 1");
        let err = EffectError::Failed(cause);
        assert_eq!(err.to_string(), "effect failed: fetch slot 1: connection reset");
    }
}
