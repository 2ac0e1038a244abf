//! Per-attempt timeout and retry with backoff.

use crate::error::TransportError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;
use veil_core::DispatchConfig;

/// How a single broker's delivery is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Upper bound on one attempt; exceeding it is a transient failure
    pub attempt_timeout: Duration,
    /// Delay after the nth failure; the last entry repeats
    pub backoff: Vec<Duration>,
}

impl RetryPolicy {
    /// Build from the dispatch configuration.
    #[must_use]
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            attempt_timeout: config.attempt_timeout(),
            backoff: config.backoff_schedule(),
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let index = usize::try_from(attempt.saturating_sub(1)).unwrap_or(usize::MAX);
        self.backoff
            .get(index)
            .or_else(|| self.backoff.last())
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&DispatchConfig::default())
    }
}

/// Run `task_fn` until it succeeds, fails permanently, or attempts run out.
///
/// Each attempt is bounded by the policy's timeout. `attempts` is incremented
/// before every attempt so the caller can read it even if this future is
/// dropped part way through.
pub async fn retry_with_backoff<F, Fut, T>(
    mut task_fn: F,
    policy: &RetryPolicy,
    attempts: &mut u32,
) -> Result<T, TransportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    loop {
        *attempts += 1;
        let attempt = *attempts;

        let error = match tokio::time::timeout(policy.attempt_timeout, task_fn()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e,
            Err(_) => TransportError::Transient(format!(
                "timed out after {}s",
                policy.attempt_timeout.as_secs_f64()
            )),
        };

        if !error.is_transient() || attempt >= policy.max_attempts {
            return Err(error);
        }

        let delay = policy.delay_after(attempt);
        warn!(
            attempt,
            max_attempts = policy.max_attempts,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %error,
            "transient delivery failure, retrying"
        );

        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            attempt_timeout: Duration::from_millis(50),
            backoff: vec![Duration::from_millis(1), Duration::from_millis(2)],
        }
    }

    #[test]
    fn test_delay_schedule_repeats_last_entry() {
        let policy = RetryPolicy {
            max_attempts: 5,
            attempt_timeout: Duration::from_secs(1),
            backoff: vec![Duration::from_millis(500), Duration::from_millis(2000)],
        };
        assert_eq!(policy.delay_after(1), Duration::from_millis(500));
        assert_eq!(policy.delay_after(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_after(7), Duration::from_millis(2000));

        let empty = RetryPolicy {
            backoff: Vec::new(),
            ..policy
        };
        assert_eq!(empty.delay_after(1), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_retry_succeeds_on_second_attempt() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let counter = attempt_count.clone();

        let task = || {
            let count = counter.clone();
            async move {
                if count.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(TransportError::Transient("relay busy".to_string()))
                } else {
                    Ok("sent")
                }
            }
        };

        let mut attempts = 0;
        let result = retry_with_backoff(task, &fast_policy(3), &mut attempts).await;

        assert_eq!(result, Ok("sent"));
        assert_eq!(attempts, 2);
        assert_eq!(attempt_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_exhausts_attempts() {
        let task = || async { Err::<(), _>(TransportError::Transient("relay busy".to_string())) };

        let mut attempts = 0;
        let result = retry_with_backoff(task, &fast_policy(3), &mut attempts).await;

        assert_eq!(result, Err(TransportError::Transient("relay busy".to_string())));
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_not_retried() {
        let task = || async { Err::<(), _>(TransportError::Permanent("mailbox unknown".to_string())) };

        let mut attempts = 0;
        let result = retry_with_backoff(task, &fast_policy(3), &mut attempts).await;

        assert!(matches!(result, Err(TransportError::Permanent(_))));
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn test_timeout_is_transient() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let counter = attempt_count.clone();

        let task = || {
            let count = counter.clone();
            async move {
                if count.fetch_add(1, Ordering::SeqCst) == 0 {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
                Ok(())
            }
        };

        let mut attempts = 0;
        let result = retry_with_backoff(task, &fast_policy(2), &mut attempts).await;

        assert!(result.is_ok());
        assert_eq!(attempts, 2);
    }
}
