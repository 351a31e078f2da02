//! Exponential-backoff retry for throttled remote calls.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{CallError, RetryError};
use crate::infrastructure::config::ingestion::RetryConfig;

/// Retries an operation while the remote keeps throttling it.
///
/// Only [`RemoteError::is_transient`](crate::error::RemoteError::is_transient)
/// failures are retried. Backoff starts at `initial_backoff`, doubles after
/// every retry and is capped at `max_backoff`. Each backoff sleep races the
/// caller's cancellation token.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff: initial_backoff.min(max_backoff),
            max_backoff,
        }
    }

    #[must_use]
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            config.initial_backoff(),
            config.max_backoff(),
        )
    }

    /// Additional attempts allowed after the first.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Sleep before retry number `retry` (zero-based).
    #[must_use]
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run `op` until it succeeds, fails fatally, exhausts retries, or the
    /// caller cancels.
    ///
    /// # Errors
    ///
    /// - [`RetryError::Cancelled`] if `cancel` fires or `op` reports cancellation
    /// - [`RetryError::Fatal`] on the first non-transient failure
    /// - [`RetryError::Exhausted`] with the last failure after `max_retries + 1` attempts
    pub async fn run<T, F, Fut>(&self, cancel: &CancellationToken, mut op: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CallError>>,
    {
        let mut attempt = 0u32;
        loop {
            if cancel.is_cancelled() {
                return Err(RetryError::Cancelled);
            }
            attempt += 1;

            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(CallError::Cancelled(_)) => return Err(RetryError::Cancelled),
                Err(CallError::Remote(err)) => err,
            };

            if !err.is_transient() {
                debug!(attempt, error = %err, "Non-retryable remote failure");
                return Err(RetryError::Fatal(err));
            }
            if attempt > self.max_retries {
                warn!(attempts = attempt, error = %err, "Retries exhausted");
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: err,
                });
            }

            let delay = self.backoff_for(attempt - 1);
            warn!(
                attempt,
                max_attempts = self.max_retries + 1,
                backoff_ms = delay.as_millis() as u64,
                error = %err,
                "Remote throttled request, backing off"
            );
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(RetryError::Cancelled),
                () = sleep(delay) => {}
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Cancelled, RemoteError};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(
            max_retries,
            Duration::from_millis(100),
            Duration::from_millis(350),
        )
    }

    fn throttled() -> CallError {
        RemoteError::Throttled { status: 429 }.into()
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = policy(10);
        let schedule: Vec<u64> = (0..5)
            .map(|i| policy.backoff_for(i).as_millis() as u64)
            .collect();
        assert_eq!(schedule, vec![100, 200, 350, 350, 350]);
    }

    #[test]
    fn backoff_saturates_for_large_attempts() {
        let policy = policy(u32::MAX);
        assert_eq!(policy.backoff_for(200), Duration::from_millis(350));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_k_transient_failures() {
        let k = 3;
        let policy = policy(5);
        let calls = Arc::new(AtomicU32::new(0));
        let stamps = Arc::new(Mutex::new(Vec::new()));
        let cancel = CancellationToken::new();

        let result = policy
            .run(&cancel, || {
                let calls = calls.clone();
                let stamps = stamps.clone();
                async move {
                    stamps.lock().push(Instant::now());
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    if n < k {
                        Err(throttled())
                    } else {
                        Ok("page")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("page"));
        assert_eq!(calls.load(Ordering::SeqCst), k + 1);

        let stamps = stamps.lock();
        let gaps: Vec<Duration> = stamps.windows(2).map(|w| w[1] - w[0]).collect();
        assert_eq!(gaps.len(), k as usize);
        assert!(gaps.windows(2).all(|w| w[0] <= w[1]), "gaps {gaps:?}");
        assert!(gaps.iter().all(|g| *g <= Duration::from_millis(350)));
    }

    #[tokio::test(start_paused = true)]
    async fn always_throttled_runs_max_retries_plus_one() {
        let policy = policy(4);
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();

        let result: Result<(), _> = policy
            .run(&cancel, || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(throttled())
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(
            result,
            Err(RetryError::Exhausted {
                attempts: 5,
                last: RemoteError::Throttled { status: 429 },
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_failure_is_not_retried() {
        let policy = policy(4);
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();

        let result: Result<(), _> = policy
            .run(&cancel, || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(RemoteError::from_status(503).into())
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            result,
            Err(RetryError::Fatal(RemoteError::Status { status: 503 }))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_backoff_aborts() {
        let policy = RetryPolicy::new(10, Duration::from_secs(30), Duration::from_secs(60));
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let result: Result<(), _> = policy
            .run(&cancel, || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(throttled())
                }
            })
            .await;

        assert_eq!(result, Err(RetryError::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn cancelled_attempt_reports_cancellation() {
        let policy = policy(3);
        let cancel = CancellationToken::new();
        let result: Result<(), _> = policy
            .run(&cancel, || async { Err(CallError::Cancelled(Cancelled)) })
            .await;
        assert_eq!(result, Err(RetryError::Cancelled));
    }
}
