//! Bounded retry for feedback writes.

use retail_core::config::FeedbackConfig;
use retail_core::RecoResult;
use std::time::Duration;
use tracing::warn;

use crate::store::FeedbackStore;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before the second attempt; grows linearly with each retry.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn from_config(config: &FeedbackConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.retry_backoff_ms),
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(50))
    }
}

/// Record one signal, retrying recoverable storage failures up to
/// `policy.max_attempts` times. Non-retryable errors return immediately.
pub fn record_with_retry<K, S>(
    store: &S,
    item: &K,
    approve: bool,
    policy: &RetryPolicy,
) -> RecoResult<()>
where
    K: std::fmt::Debug,
    S: FeedbackStore<K> + ?Sized,
{
    let mut attempt = 1;
    loop {
        match store.record_feedback(item, approve) {
            Ok(()) => return Ok(()),
            Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                metrics::counter!("feedback.retry").increment(1);
                warn!(
                    item = ?item,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "Feedback write failed, retrying"
                );
                std::thread::sleep(policy.backoff * attempt);
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    warn!(item = ?item, attempts = attempt, error = %e, "Feedback write gave up");
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retail_core::RecoError;
    use crate::memory::MemoryFeedbackStore;
    use crate::record::FeedbackRecord;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` writes, then delegates to memory.
    struct FlakyStore {
        failures: u32,
        calls: AtomicU32,
        inner: MemoryFeedbackStore<String>,
    }

    impl FlakyStore {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                inner: MemoryFeedbackStore::new(),
            }
        }
    }

    impl FeedbackStore<String> for FlakyStore {
        fn record_feedback(&self, item: &String, approve: bool) -> RecoResult<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(RecoError::Storage("disk full".to_string()));
            }
            self.inner.record_feedback(item, approve)
        }

        fn feedback_record(&self, item: &String) -> RecoResult<Option<FeedbackRecord>> {
            self.inner.feedback_record(item)
        }
    }

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(1))
    }

    #[test]
    fn test_retry_recovers_from_transient_failure() {
        let store = FlakyStore::new(2);
        record_with_retry(&store, &"X".to_string(), true, &fast_policy(3)).unwrap();
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
        assert_eq!(store.average_approval(&"X".to_string()).unwrap(), Some(1.0));
    }

    #[test]
    fn test_retry_is_bounded() {
        let store = FlakyStore::new(10);
        let err = record_with_retry(&store, &"X".to_string(), true, &fast_policy(3)).unwrap_err();
        assert!(matches!(err, RecoError::Storage(_)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
        assert_eq!(store.average_approval(&"X".to_string()).unwrap(), None);
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts, 1);
    }
}
