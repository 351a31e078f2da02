//! Token bucket admission control for outbound remote calls.
//!
//! One [`RateLimiter`] is shared (behind an `Arc`) by every worker of every
//! fetch an orchestrator runs. The bucket refills continuously at `rate`
//! tokens per second up to `capacity`, so a quiet period banks a burst and a
//! busy period settles at the sustained rate.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::Cancelled;
use crate::infrastructure::config::ingestion::{RateLimitConfig, MIN_REQUESTS_PER_SECOND};

/// Shortest sleep between refill checks while waiting.
const MIN_WAIT: Duration = Duration::from_millis(1);

/// Longest single sleep; a slow bucket is re-checked at least this often.
const MAX_WAIT: Duration = Duration::from_secs(5);

/// Time source for the bucket.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Clock backed by tokio's timer, which tests can pause and advance.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket shared by concurrent callers.
///
/// Waiters are served roughly in arrival order once tokens appear, with no
/// strict FIFO guarantee. Every grant decrements the bucket under its lock,
/// so one token is never handed to two callers.
pub struct RateLimiter {
    capacity: f64,
    rate: f64,
    bucket: Mutex<Bucket>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a full bucket driven by [`TokioClock`].
    #[must_use]
    pub fn new(requests_per_second: f64, burst: u32) -> Self {
        Self::with_clock(requests_per_second, burst, Arc::new(TokioClock))
    }

    /// Create a full bucket driven by an arbitrary clock.
    ///
    /// Rates below [`MIN_REQUESTS_PER_SECOND`], or not finite, are raised to it.
    #[must_use]
    pub fn with_clock(requests_per_second: f64, burst: u32, clock: Arc<dyn Clock>) -> Self {
        let capacity = f64::from(burst.max(1));
        let rate = if requests_per_second.is_finite() {
            requests_per_second.max(MIN_REQUESTS_PER_SECOND)
        } else {
            MIN_REQUESTS_PER_SECOND
        };
        let now = clock.now();
        Self {
            capacity,
            rate,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: now,
            }),
            clock,
        }
    }

    #[must_use]
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests_per_second, config.burst)
    }

    /// Burst ceiling.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity as u32
    }

    /// Sustained refill rate in tokens per second.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Tokens currently available, after refilling.
    #[must_use]
    pub fn available(&self) -> f64 {
        let mut bucket = self.bucket.lock();
        self.refill(&mut bucket);
        bucket.tokens
    }

    /// Take a token if one is available right now. Never blocks.
    #[must_use]
    pub fn allow(&self) -> bool {
        self.try_acquire().is_ok()
    }

    /// Wait until a token is granted or `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the token fires first. A cancelled caller is
    /// never charged a token.
    pub async fn wait(&self, cancel: &CancellationToken) -> Result<(), Cancelled> {
        loop {
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }
            let delay = match self.try_acquire() {
                Ok(()) => return Ok(()),
                Err(delay) => delay,
            };
            trace!(delay_ms = delay.as_millis() as u64, "Waiting for rate limit token");
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Cancelled),
                () = sleep(delay) => {}
            }
        }
    }

    /// Take one token, or report how long until one will exist.
    fn try_acquire(&self) -> Result<(), Duration> {
        let mut bucket = self.bucket.lock();
        self.refill(&mut bucket);
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return Ok(());
        }
        let deficit = 1.0 - bucket.tokens;
        let delay = Duration::try_from_secs_f64(deficit / self.rate).unwrap_or(MAX_WAIT);
        Err(delay.clamp(MIN_WAIT, MAX_WAIT))
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(bucket.last_refill);
        bucket.tokens = (bucket.tokens + elapsed.as_secs_f64() * self.rate).min(self.capacity);
        bucket.last_refill = now;
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("capacity", &self.capacity)
            .field("rate", &self.rate)
            .field("tokens", &self.bucket.lock().tokens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::clock::ManualClock;

    fn manual(rate: f64, burst: u32) -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let limiter = RateLimiter::with_clock(rate, burst, clock.clone());
        (limiter, clock)
    }

    #[test]
    fn starts_full_and_grants_exactly_capacity() {
        let (limiter, _clock) = manual(5.0, 10);
        let granted = (0..25).filter(|_| limiter.allow()).count();
        assert_eq!(granted, 10);
        assert!(!limiter.allow());
    }

    #[test]
    fn refill_never_exceeds_capacity() {
        let (limiter, clock) = manual(5.0, 10);
        while limiter.allow() {}

        clock.advance(Duration::from_secs(3600));
        assert!((limiter.available() - 10.0).abs() < f64::EPSILON);
        let granted = (0..100).filter(|_| limiter.allow()).count();
        assert_eq!(granted, 10);
    }

    #[test]
    fn refill_is_continuous() {
        let (limiter, clock) = manual(5.0, 10);
        while limiter.allow() {}

        clock.advance(Duration::from_millis(100));
        assert!(!limiter.allow(), "half a token is not a token");
        clock.advance(Duration::from_millis(100));
        assert!(limiter.allow());
        assert!(!limiter.allow());
    }

    #[test]
    fn sustained_rate_bounded_over_long_window() {
        let rate = 5.0;
        let burst = 10;
        let (limiter, clock) = manual(rate, burst);

        let window_secs = 60;
        let mut granted = 0u64;
        for _ in 0..(window_secs * 100) {
            // Greedy caller hammering the bucket every 10ms.
            while limiter.allow() {
                granted += 1;
            }
            clock.advance(Duration::from_millis(10));
        }

        let ceiling = u64::from(burst) + (rate as u64) * window_secs;
        assert!(granted <= ceiling, "granted {granted} > ceiling {ceiling}");
        assert!(granted >= ceiling - 2, "granted {granted} far below {ceiling}");
    }

    #[test]
    fn tokens_stay_within_bounds() {
        let (limiter, clock) = manual(50.0, 4);
        for step in 0..500u64 {
            let _ = limiter.allow();
            clock.advance(Duration::from_millis(step % 7));
            let tokens = limiter.available();
            assert!((0.0..=4.0).contains(&tokens), "tokens out of range: {tokens}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn wait_returns_immediately_with_tokens() {
        let limiter = RateLimiter::new(1.0, 3);
        let cancel = CancellationToken::new();
        let start = Instant::now();
        for _ in 0..3 {
            limiter.wait(&cancel).await.unwrap();
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_blocks_until_refill() {
        let limiter = RateLimiter::new(10.0, 1);
        let cancel = CancellationToken::new();
        limiter.wait(&cancel).await.unwrap();

        let start = Instant::now();
        limiter.wait(&cancel).await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(99), "elapsed {elapsed:?}");
        assert!(elapsed <= Duration::from_millis(110), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_waiters_do_not_double_spend() {
        let limiter = Arc::new(RateLimiter::new(10.0, 5));
        let cancel = CancellationToken::new();
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..15 {
            let limiter = limiter.clone();
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move {
                limiter.wait(&cancel).await.unwrap();
                Instant::now()
            }));
        }
        let mut grants = Vec::new();
        for handle in handles {
            grants.push(handle.await.unwrap());
        }

        // 5 burst tokens, then 10 more at 10/s: the last grant needs ~1s.
        let last = grants.iter().max().unwrap().duration_since(start);
        assert!(last >= Duration::from_millis(990), "last grant at {last:?}");
        let immediate = grants.iter().filter(|t| **t == start).count();
        assert_eq!(immediate, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_reports_cancellation() {
        let limiter = RateLimiter::new(0.001, 1);
        let cancel = CancellationToken::new();
        limiter.wait(&cancel).await.unwrap();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        assert_eq!(limiter.wait(&cancel).await, Err(Cancelled));
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn degenerate_rates_are_raised_to_the_floor() {
        for rate in [0.0, -3.0, 1e-20, f64::NAN, f64::INFINITY] {
            let (limiter, _clock) = manual(rate, 1);
            assert!((limiter.rate() - MIN_REQUESTS_PER_SECOND).abs() < f64::EPSILON);
            assert!(limiter.allow());
            assert_eq!(limiter.try_acquire(), Err(MAX_WAIT));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_bucket_keeps_waiting_in_bounded_steps() {
        let limiter = RateLimiter::new(1e-20, 1);
        let cancel = CancellationToken::new();
        limiter.wait(&cancel).await.unwrap();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(30)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        assert_eq!(limiter.wait(&cancel).await, Err(Cancelled));
        assert!(start.elapsed() < Duration::from_secs(31));
    }

    #[tokio::test]
    async fn cancelled_caller_is_not_charged() {
        let limiter = RateLimiter::new(1.0, 2);
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(limiter.wait(&cancel).await, Err(Cancelled));
        assert!(limiter.available() >= 1.99);
    }
}
