//! Order cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Maximum age of a served entry (default: 5 minutes).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// zstd level for cached payloads.
    #[serde(default = "default_compression_level")]
    pub compression_level: i32,
}

const fn default_ttl_secs() -> u64 {
    300
}

const fn default_compression_level() -> i32 {
    3
}

impl CacheConfig {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            compression_level: default_compression_level(),
        }
    }
}
