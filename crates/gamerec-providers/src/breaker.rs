//! Per-provider circuit breaker.
//!
//! A failure-rate gate with two states: Closed (admit everything) and Open
//! (reject everything). After [`OPEN_TIMEOUT`] has elapsed since the last
//! recorded failure the breaker re-admits all traffic and resets its
//! counters — there is no half-open probing state; recovery is optimistic
//! and the next failure streak re-opens it.
//!
//! The breaker is a best-effort heuristic, not a linearizable guard:
//! concurrent calls may race on the counters and approximate increments are
//! acceptable. Each provider owns exactly one breaker behind a short-lived
//! `std::sync::Mutex`; nothing outside that provider's call path mutates it.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, warn};

/// Consecutive failures before the breaker opens.
pub const FAILURE_THRESHOLD: u32 = 3;

/// How long an open breaker rejects calls after the last failure.
pub const OPEN_TIMEOUT: Duration = Duration::from_secs(60);

/// Circuit breaker state for one provider.
#[derive(Debug)]
pub struct CircuitBreaker {
    failure_count: u32,
    last_failure: Option<Instant>,
    open: bool,
    threshold: u32,
    open_timeout: Duration,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitBreaker {
    /// Breaker with the standard policy (3 failures, 60s cooldown).
    pub fn new() -> Self {
        Self::with_policy(FAILURE_THRESHOLD, OPEN_TIMEOUT)
    }

    /// Breaker with an explicit policy. Tests use short timeouts here.
    pub fn with_policy(threshold: u32, open_timeout: Duration) -> Self {
        Self {
            failure_count: 0,
            last_failure: None,
            open: false,
            threshold,
            open_timeout,
        }
    }

    /// Admission check for the call path.
    ///
    /// Closed breakers admit immediately. An open breaker rejects until the
    /// cooldown since the last failure has elapsed, at which point it closes,
    /// resets the failure count, and admits.
    pub fn admit(&mut self) -> bool {
        if !self.open {
            return true;
        }

        let cooled_down = self
            .last_failure
            .map(|at| at.elapsed() > self.open_timeout)
            .unwrap_or(true);

        if cooled_down {
            self.open = false;
            self.failure_count = 0;
            info!("circuit breaker closed, allowing requests again");
            true
        } else {
            false
        }
    }

    /// Record a failed remote call; opens the breaker at the threshold.
    pub fn record_failure(&mut self) {
        self.failure_count += 1;
        self.last_failure = Some(Instant::now());

        if self.failure_count >= self.threshold && !self.open {
            self.open = true;
            warn!(
                failures = self.failure_count,
                "circuit breaker opened after repeated failures"
            );
        }
    }

    /// Record a successful remote call; resets the count and closes.
    pub fn record_success(&mut self) {
        self.failure_count = 0;
        if self.open {
            self.open = false;
            info!("circuit breaker closed after successful request");
        }
    }

    /// Whether the breaker is currently open (no reset side effect).
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Monitoring snapshot for the status endpoint.
    pub fn status(&self, api_key_configured: bool) -> BreakerStatus {
        BreakerStatus {
            circuit_open: self.open,
            failure_count: self.failure_count,
            seconds_since_last_failure: self.last_failure.map(|at| at.elapsed().as_secs()),
            open_timeout_secs: self.open_timeout.as_secs(),
            api_key_configured,
        }
    }
}

/// Serializable snapshot of a provider's breaker state.
#[derive(Clone, Debug, Serialize)]
pub struct BreakerStatus {
    pub circuit_open: bool,
    pub failure_count: u32,
    pub seconds_since_last_failure: Option<u64>,
    pub open_timeout_secs: u64,
    pub api_key_configured: bool,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[test]
    fn test_closed_breaker_admits() {
        let mut breaker = CircuitBreaker::new();
        assert!(breaker.admit());
        assert!(!breaker.is_open());
    }

    #[test]
    fn test_opens_after_three_failures() {
        let mut breaker = CircuitBreaker::new();
        breaker.record_failure();
        breaker.record_failure();
        assert!(!breaker.is_open());
        breaker.record_failure();
        assert!(breaker.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejects_while_open() {
        let mut breaker = CircuitBreaker::new();
        for _ in 0..3 {
            breaker.record_failure();
        }

        // Fourth admission check before the timeout: rejected.
        advance(Duration::from_secs(30)).await;
        assert!(!breaker.admit());
        assert!(breaker.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_admits_and_resets_after_timeout() {
        let mut breaker = CircuitBreaker::new();
        for _ in 0..3 {
            breaker.record_failure();
        }

        advance(Duration::from_secs(61)).await;
        assert!(breaker.admit());
        assert!(!breaker.is_open());

        let status = breaker.status(true);
        assert_eq!(status.failure_count, 0);
        assert!(!status.circuit_open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reopens_at_threshold_after_reset() {
        // No gradual recovery: after the timeout reset, a fresh failure
        // streak is needed to re-open.
        let mut breaker = CircuitBreaker::new();
        for _ in 0..3 {
            breaker.record_failure();
        }
        advance(Duration::from_secs(61)).await;
        assert!(breaker.admit());

        breaker.record_failure();
        assert!(!breaker.is_open());
        breaker.record_failure();
        breaker.record_failure();
        assert!(breaker.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_count_and_closes() {
        let mut breaker = CircuitBreaker::new();
        breaker.record_failure();
        breaker.record_failure();
        breaker.record_success();

        let status = breaker.status(true);
        assert_eq!(status.failure_count, 0);

        for _ in 0..3 {
            breaker.record_failure();
        }
        assert!(breaker.is_open());
        breaker.record_success();
        assert!(!breaker.is_open());
        assert!(breaker.admit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_snapshot() {
        let mut breaker = CircuitBreaker::new();
        breaker.record_failure();
        advance(Duration::from_secs(5)).await;

        let status = breaker.status(false);
        assert!(!status.circuit_open);
        assert_eq!(status.failure_count, 1);
        assert_eq!(status.seconds_since_last_failure, Some(5));
        assert_eq!(status.open_timeout_secs, 60);
        assert!(!status.api_key_configured);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_policy() {
        let mut breaker = CircuitBreaker::with_policy(1, Duration::from_secs(5));
        breaker.record_failure();
        assert!(breaker.is_open());
        assert!(!breaker.admit());

        advance(Duration::from_secs(6)).await;
        assert!(breaker.admit());
    }
}
