//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use crate::infrastructure::config::cache::CacheConfig;
use crate::infrastructure::config::ingestion::{FetcherConfig, RateLimitConfig, RetryConfig};

/// Reference limiter: 5 req/s sustained, burst of 400.
pub fn rate_limit() -> RateLimitConfig {
    RateLimitConfig {
        requests_per_second: 5.0,
        burst: 400,
    }
}

/// Short backoffs so paused-clock tests stay small.
pub fn retry() -> RetryConfig {
    RetryConfig {
        max_retries: 3,
        initial_backoff_ms: 50,
        max_backoff_ms: 400,
    }
}

pub fn fetcher(workers: usize) -> FetcherConfig {
    FetcherConfig {
        workers,
        fetch_timeout_secs: 60,
    }
}

pub fn cache(ttl_secs: u64) -> CacheConfig {
    CacheConfig {
        ttl_secs,
        compression_level: 3,
    }
}
