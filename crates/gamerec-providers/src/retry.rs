//! Bounded retry with exponential backoff for remote calls.
//!
//! Policy: attempt the call; on failure or an empty reply, sleep
//! `base_delay * 2^attempt` and try again. The final attempt's error
//! propagates to the provider (which records a breaker failure and serves
//! the fallback path); a reply that stays empty through every attempt is a
//! "no result", not an error. The executor is not designed to be
//! interrupted mid-backoff.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use gamerec_core::ProviderError;

/// Total attempts per call (first try + retries).
pub const MAX_ATTEMPTS: u32 = 3;

/// Base backoff delay; doubles per attempt (2s, 4s, …).
pub const BASE_DELAY: Duration = Duration::from_secs(2);

/// Retry policy wrapper for a single fallible remote call.
#[derive(Clone, Debug)]
pub struct RetryExecutor {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(MAX_ATTEMPTS, BASE_DELAY)
    }
}

impl RetryExecutor {
    /// Executor with an explicit policy. Tests use millisecond delays here.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Run `op` until it yields a value or attempts are exhausted.
    ///
    /// - `Ok(Some(v))` — a usable reply, returned immediately.
    /// - `Ok(None)` — every attempt returned an empty reply.
    /// - `Err(e)` — the final attempt failed with `e`.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<Option<T>, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, ProviderError>>,
    {
        for attempt in 0..self.max_attempts {
            let last = attempt + 1 == self.max_attempts;

            match op().await {
                Ok(Some(value)) => {
                    debug!(attempt = attempt + 1, "remote call succeeded");
                    return Ok(Some(value));
                }
                Ok(None) => {
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        "remote call returned no usable reply"
                    );
                    if last {
                        return Ok(None);
                    }
                }
                Err(err) => {
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "remote call failed"
                    );
                    if last {
                        return Err(err);
                    }
                }
            }

            let delay = self.base_delay * 2u32.pow(attempt);
            debug!(delay_ms = delay.as_millis() as u64, "retrying after backoff");
            tokio::time::sleep(delay).await;
        }

        Ok(None)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt_sleeps_nothing() {
        let executor = RetryExecutor::default();
        let start = Instant::now();

        let result = executor.run(|| async { Ok(Some("ok")) }).await;

        assert_eq!(result.unwrap(), Some("ok"));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_failures_then_success() {
        let calls = Cell::new(0u32);
        let executor = RetryExecutor::default();
        let start = Instant::now();

        let result = executor
            .run(|| {
                let n = calls.get() + 1;
                calls.set(n);
                async move {
                    if n <= 2 {
                        Err(ProviderError::remote("transient"))
                    } else {
                        Ok(Some(n))
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), Some(3));
        assert_eq!(calls.get(), 3);
        // Exactly two backoff sleeps: 2s + 4s.
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_failure_propagates_after_three_attempts() {
        let calls = Cell::new(0u32);
        let executor = RetryExecutor::default();
        let start = Instant::now();

        let result: Result<Option<()>, _> = executor
            .run(|| {
                calls.set(calls.get() + 1);
                async { Err(ProviderError::remote("down")) }
            })
            .await;

        assert!(matches!(result, Err(ProviderError::Remote(_))));
        assert_eq!(calls.get(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_replies_yield_no_result_not_error() {
        let calls = Cell::new(0u32);
        let executor = RetryExecutor::default();

        let result: Result<Option<String>, _> = executor
            .run(|| {
                calls.set(calls.get() + 1);
                async { Ok(None) }
            })
            .await;

        assert!(matches!(result, Ok(None)));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_policy_backoff_doubles() {
        let calls = Cell::new(0u32);
        let executor = RetryExecutor::new(4, Duration::from_millis(100));
        let start = Instant::now();

        let result: Result<Option<()>, _> = executor
            .run(|| {
                calls.set(calls.get() + 1);
                async { Err(ProviderError::remote("down")) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 4);
        // 100ms + 200ms + 400ms
        assert_eq!(start.elapsed(), Duration::from_millis(700));
    }
}
