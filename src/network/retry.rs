//! Publish retry policy
//!
//! The node reports a stale `previous` only through its free-text reason.
//! Classification sits behind a function so the retry loop does not depend
//! on that vocabulary.

use std::fmt;
use std::sync::Arc;

/// Reason texts meaning our view of the account chain is out of date
pub const STALE_REASONS: [&str; 2] = ["Fork", "Gap previous block"];

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Decides whether a rejection reason means "refresh and try again"
pub type RejectionClassifier = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Matches the node's literal stale-chain reasons
pub fn is_stale_reason(reason: &str) -> bool {
    let reason = reason.trim();
    STALE_REASONS.iter().any(|stale| *stale == reason)
}

#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    classifier: RejectionClassifier,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            classifier: Arc::new(is_stale_reason),
        }
    }

    pub fn with_classifier<F>(mut self, classifier: F) -> RetryPolicy
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn is_stale(&self, reason: &str) -> bool {
        (self.classifier)(reason)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}
