// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded retry with exponential backoff.
//!
//! One policy object is shared by every external-call site (classification
//! batches, membership writes) so failure handling stays consistent across
//! the pipeline. Only errors flagged transient via
//! [`TgsortError::is_transient`] are retried.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::error::TgsortError;

/// Bounded-retry policy: at most `max_attempts` total attempts, with delay
/// `backoff_base * 2^(n-1)` before the n-th retry, plus up to 10% jitter.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_base: Duration,
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` is clamped to at least 1.
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op`, retrying transient failures until attempts are exhausted.
    ///
    /// Permanent errors are returned immediately. When retries are
    /// exhausted, the last transient error is returned.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, TgsortError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TgsortError>>,
    {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                let delay = self.delay_before(attempt);
                warn!(
                    label,
                    attempt,
                    max_attempts = self.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "retrying after transient failure"
                );
                tokio::time::sleep(delay).await;
            }

            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    warn!(label, attempt, error = %err, "transient failure");
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error
            .unwrap_or_else(|| TgsortError::Internal(format!("{label}: retry loop exhausted"))))
    }

    /// Delay before attempt `n` (n >= 2): exponential in the retry count,
    /// with uniform jitter in [0, 10%) of the computed delay.
    fn delay_before(&self, attempt: u32) -> Duration {
        let exponent = (attempt - 2).min(16);
        let delay = self.backoff_base.saturating_mul(1u32 << exponent);
        let jitter = delay.mul_f64(rand::thread_rng().gen_range(0.0..0.1));
        delay + jitter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(100))
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = policy()
            .run("test", || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(TgsortError::classifier_transient("HTTP 503"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = policy()
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TgsortError::classifier("bad JSON")) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_returns_last_transient_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = policy()
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TgsortError::classifier_transient("HTTP 429")) }
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn max_attempts_clamped_to_one() {
        let policy = RetryPolicy::new(0, Duration::from_millis(10));
        assert_eq!(policy.max_attempts(), 1);

        let calls = AtomicU32::new(0);
        let _: Result<(), _> = policy
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TgsortError::classifier_transient("again")) }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
