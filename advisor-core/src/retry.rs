//! Retry wrapper for calls that can hit a provider rate limit.
//!
//! Only quota errors (see [`crate::AdvisorError::is_quota`]) are retried. The delay starts at the
//! initial backoff and doubles after every retry; there is no jitter, no cap and no overall
//! deadline, so the total number of invocations is bounded by `max_retries + 1`.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::Result;

/// Retry budget for one remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

/// Runs `operation`, retrying quota failures with exponential backoff.
pub async fn with_backoff<T, F, Fut>(mut operation: F, policy: RetryPolicy) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut retries_left = policy.max_retries;
    let mut backoff = policy.initial_backoff;
    let mut attempt: u32 = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_quota() && retries_left > 0 => {
                warn!(
                    attempt = attempt,
                    retries_left = retries_left,
                    delay_ms = backoff.as_millis() as u64,
                    error = %err,
                    "Quota exceeded, backing off before retry"
                );
                tokio::time::sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
                retries_left -= 1;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdvisorError;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    fn quota_error(message: &str) -> AdvisorError {
        AdvisorError::CompletionFailed(message.to_string())
    }

    fn recorder() -> Arc<Mutex<Vec<Instant>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test(start_paused = true)]
    async fn quota_errors_use_every_retry_with_doubling_delay() {
        let calls = recorder();
        let policy = RetryPolicy::new(3, Duration::from_millis(500));

        let result: Result<()> = with_backoff(
            || {
                let calls = calls.clone();
                async move {
                    calls.lock().unwrap().push(Instant::now());
                    Err(quota_error("429 RESOURCE_EXHAUSTED"))
                }
            },
            policy,
        )
        .await;

        assert!(result.unwrap_err().is_quota());
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 4);

        let delays: Vec<Duration> = calls.windows(2).map(|w| w[1] - w[0]).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(500),
                Duration::from_millis(1000),
                Duration::from_millis(2000),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn other_errors_are_returned_after_one_call() {
        let calls = recorder();

        let result: Result<()> = with_backoff(
            || {
                let calls = calls.clone();
                async move {
                    calls.lock().unwrap().push(Instant::now());
                    Err(AdvisorError::CompletionFailed("connection refused".into()))
                }
            },
            RetryPolicy::default(),
        )
        .await;

        assert!(matches!(result, Err(AdvisorError::CompletionFailed(_))));
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn success_after_rate_limit_returns_value() {
        let calls = recorder();
        let started = Instant::now();

        let result = with_backoff(
            || {
                let calls = calls.clone();
                async move {
                    let mut calls = calls.lock().unwrap();
                    calls.push(Instant::now());
                    if calls.len() < 3 {
                        Err(quota_error("HTTP 429"))
                    } else {
                        Ok("done")
                    }
                }
            },
            RetryPolicy::new(5, Duration::from_millis(100)),
        )
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.lock().unwrap().len(), 3);
        assert_eq!(started.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_means_single_attempt() {
        let calls = recorder();

        let result: Result<()> = with_backoff(
            || {
                let calls = calls.clone();
                async move {
                    calls.lock().unwrap().push(Instant::now());
                    Err(quota_error("RESOURCE_EXHAUSTED"))
                }
            },
            RetryPolicy::new(0, Duration::from_secs(1)),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.lock().unwrap().len(), 1);
    }
}
