//! Cache-aside store for merged region order collections.
//!
//! Entries are JSON, zstd-compressed, keyed by region. Anything that stops an
//! entry from being read back (backend error, corrupt payload, expired age)
//! is reported as a miss so the caller falls through to the next tier.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{MarketOrder, RegionId};
use crate::error::CacheError;
use crate::infrastructure::config::cache::CacheConfig;
use crate::port::CacheBackend;

#[derive(Serialize)]
struct EntryRef<'a> {
    stored_at: DateTime<Utc>,
    orders: &'a [MarketOrder],
}

#[derive(Deserialize)]
struct Entry {
    stored_at: DateTime<Utc>,
    orders: Vec<MarketOrder>,
}

/// Compressed, TTL-bound cache of each region's latest merged orders.
pub struct OrderCache {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
    compression_level: i32,
}

impl OrderCache {
    #[must_use]
    pub fn new(backend: Arc<dyn CacheBackend>, config: &CacheConfig) -> Self {
        Self {
            backend,
            ttl: config.ttl(),
            compression_level: config.compression_level,
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Backend key for a region.
    #[must_use]
    pub fn key(region: RegionId) -> String {
        format!("market:orders:{region}")
    }

    /// Cached orders for `region`, or `None` on any kind of miss.
    pub async fn get(&self, region: RegionId) -> Option<Vec<MarketOrder>> {
        let key = Self::key(region);
        let bytes = match self.backend.get(&key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(region = %region, "Order cache miss");
                return None;
            }
            Err(err) => {
                warn!(region = %region, error = %err, "Order cache read failed, treating as miss");
                return None;
            }
        };

        let entry = match self.decode(&bytes) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(region = %region, error = %err, "Order cache entry unreadable, treating as miss");
                return None;
            }
        };

        let age = Utc::now()
            .signed_duration_since(entry.stored_at)
            .to_std()
            .unwrap_or_default();
        if age > self.ttl {
            debug!(region = %region, age_secs = age.as_secs(), "Order cache entry expired");
            return None;
        }

        debug!(region = %region, orders = entry.orders.len(), "Order cache hit");
        Some(entry.orders)
    }

    /// Store `orders` as the current snapshot for `region`.
    ///
    /// # Errors
    ///
    /// Returns a [`CacheError`] if encoding or the backend write fails.
    /// Callers treat this as best effort.
    pub async fn set(&self, region: RegionId, orders: &[MarketOrder]) -> Result<(), CacheError> {
        let bytes = self.encode(Utc::now(), orders)?;
        debug!(
            region = %region,
            orders = orders.len(),
            bytes = bytes.len(),
            "Caching region orders"
        );
        self.backend.set(&Self::key(region), bytes, self.ttl).await
    }

    /// Drop the cached snapshot for `region`.
    ///
    /// # Errors
    ///
    /// Returns a [`CacheError`] if the backend delete fails.
    pub async fn invalidate(&self, region: RegionId) -> Result<(), CacheError> {
        self.backend.delete(&Self::key(region)).await
    }

    pub(crate) fn encode(
        &self,
        stored_at: DateTime<Utc>,
        orders: &[MarketOrder],
    ) -> Result<Vec<u8>, CacheError> {
        let json = serde_json::to_vec(&EntryRef { stored_at, orders })
            .map_err(|e| CacheError::Encode(e.to_string()))?;
        zstd::encode_all(json.as_slice(), self.compression_level)
            .map_err(|e| CacheError::Encode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Entry, CacheError> {
        let json = zstd::decode_all(bytes).map_err(|e| CacheError::Decode(e.to_string()))?;
        serde_json::from_slice(&json).map_err(|e| CacheError::Decode(e.to_string()))
    }
}
