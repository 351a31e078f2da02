//! Key-value cache backend port.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

/// Opaque TTL-capable key-value store.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Bytes under `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key` for at most `ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Drop `key` if present.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
