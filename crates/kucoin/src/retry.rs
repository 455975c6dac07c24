//! Opt-in retry wrapper for application code.
//!
//! The client itself never retries: clock fetches, signed requests, and
//! page fetches each fail exactly once. Callers that want a retry policy
//! wrap individual operations with [`retry_async`].

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use crate::error::Result;

/// Runs `op` up to `attempts` times, sleeping `delay` between attempts.
///
/// Any error is considered retryable; the last attempt's error is
/// returned. An `attempts` of zero is treated as one.
pub async fn retry_async<T, F, Fut>(attempts: u32, delay: Duration, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempts.max(1);
    for attempt in 1..attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!("Attempt {}/{} failed: {}", attempt, attempts, err);
                sleep(delay).await;
            }
        }
    }
    op().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KucoinError;

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let mut calls = 0u32;
        let value = retry_async(3, Duration::from_millis(1), || {
            calls += 1;
            let result = if calls < 3 {
                Err(KucoinError::HttpError {
                    status: 503,
                    body: "unavailable".to_string(),
                })
            } else {
                Ok(42)
            };
            async move { result }
        })
        .await
        .unwrap();

        assert_eq!(value, 42);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_returns_last_error_when_exhausted() {
        let mut calls = 0u32;
        let err = retry_async(2, Duration::from_millis(1), || {
            calls += 1;
            let status = 500 + calls as u16;
            async move {
                Err::<(), _>(KucoinError::HttpError {
                    status,
                    body: "boom".to_string(),
                })
            }
        })
        .await
        .unwrap_err();

        assert_eq!(calls, 2);
        // The error from the final attempt is the one surfaced.
        assert!(matches!(err, KucoinError::HttpError { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let mut calls = 0u32;
        let value = retry_async(0, Duration::from_millis(1), || {
            calls += 1;
            async move { Ok("done") }
        })
        .await
        .unwrap();

        assert_eq!(value, "done");
        assert_eq!(calls, 1);
    }
}
