//! Resilient executor: bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use showcase_core::storage::Result;

use crate::config::StorageConfig;

/// Retry budget for a single backend call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub(crate) fn from_config(config: &StorageConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.retry_base(),
        }
    }

    /// Backoff after the given 0-based failed attempt: `base * 2^attempt`.
    pub(crate) fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
        }
    }
}

/// Executes one backend call with retry-on-transient-failure semantics.
///
/// Fatal failures are re-raised immediately. Transient failures are retried
/// up to the attempt budget, sleeping `base * 2^attempt` between attempts
/// (never after the final one). Once the budget is exhausted the last
/// observed error is re-raised unchanged so the caller sees the original
/// classification. Every attempt is logged with its number and, on
/// failure, the error code.
pub(crate) async fn execute_with_retry<T, F, Fut>(
    op: &'static str,
    policy: RetryPolicy,
    mut call: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        match call().await {
            Ok(value) => {
                tracing::trace!(op, attempt, "backend call succeeded");
                return Ok(value);
            }
            Err(err) if err.is_retryable() && attempt + 1 < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    op,
                    attempt,
                    code = err.code().unwrap_or("unknown"),
                    delay_ms = delay.as_millis() as u64,
                    "transient backend failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                tracing::error!(
                    op,
                    attempt,
                    code = err.code().unwrap_or("unknown"),
                    retryable = err.is_retryable(),
                    "backend call failed"
                );
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use showcase_core::storage::StorageError;

    use super::*;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
        }
    }

    fn throttled() -> StorageError {
        StorageError::Transient {
            code: "ThrottlingException".to_string(),
            message: "slow down".to_string(),
        }
    }

    fn validation() -> StorageError {
        StorageError::Backend {
            code: "ValidationException".to_string(),
            message: "bad request".to_string(),
        }
    }

    #[test]
    fn test_backoff_doubles_per_attempt() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_succeeds_after_two_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = execute_with_retry("test", fast_policy(3), || {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(throttled())
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fatal_failure_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<u32> = execute_with_retry("test", fast_policy(3), || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(validation())
            }
        })
        .await;

        assert_eq!(result, Err(validation()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhausted_budget_reraises_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<u32> = execute_with_retry("test", fast_policy(3), || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(throttled())
            }
        })
        .await;

        // The original error surfaces, not a synthetic retries-exhausted one.
        assert_eq!(result, Err(throttled()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_single_attempt_budget_never_sleeps() {
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<u32> = execute_with_retry("test", fast_policy(1), || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(throttled())
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
