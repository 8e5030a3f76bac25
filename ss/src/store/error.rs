//! Store error types

use thiserror::Error;

use crate::reducer::BoxError;

/// Error from a single dispatch
#[derive(Debug, Error)]
pub enum StoreError {
    /// The reducer rejected the action; the state is unchanged and no
    /// subscriber ran.
    #[error("reducer rejected the action: {0}")]
    Reducer(#[source] BoxError),

    /// The state change was committed but one or more subscribers failed.
    #[error(transparent)]
    Subscribers(#[from] SubscriberErrors),
}

impl StoreError {
    /// True when the dispatch itself was rejected and the state is unchanged
    pub fn is_rejection(&self) -> bool {
        matches!(self, StoreError::Reducer(_))
    }

    /// The collected subscriber failures, if that is what this error carries
    pub fn subscriber_failures(&self) -> Option<&[SubscriberError]> {
        match self {
            StoreError::Subscribers(errors) => Some(&errors.failures),
            StoreError::Reducer(_) => None,
        }
    }
}

/// Umbrella error aggregating every subscriber that failed during one dispatch
///
/// Raised only after the full subscriber pass, so later subscribers still run
/// when an earlier one fails.
#[derive(Debug, Error)]
#[error("{} subscriber(s) failed after a committed dispatch", failures.len())]
pub struct SubscriberErrors {
    /// One entry per failing subscriber, in registration order
    pub failures: Vec<SubscriberError>,
}

/// A single subscriber failure
#[derive(Debug, Error)]
#[error("subscriber {index}: {error}")]
pub struct SubscriberError {
    /// Registration index of the failing subscriber
    pub index: usize,
    #[source]
    pub error: BoxError,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(msg: &str) -> BoxError {
        msg.to_string().into()
    }

    #[test]
    fn test_is_rejection() {
        assert!(StoreError::Reducer(boxed("nope")).is_rejection());

        let err = StoreError::Subscribers(SubscriberErrors { failures: vec![] });
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_subscriber_failures_accessor() {
        let err = StoreError::from(SubscriberErrors {
            failures: vec![SubscriberError {
                index: 2,
                error: boxed("boom"),
            }],
        });

        let failures = err.subscriber_failures().expect("should carry failures");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].index, 2);
    }
}
