//! Cache-first ingestion orchestrator.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::cache::OrderCache;
use crate::application::fetcher::ParallelPageFetcher;
use crate::domain::{MarketOrder, RegionId, TypeId};
use crate::error::{Error, Result};
use crate::port::OrderStore;

/// How current the caller needs a region's orders to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Cache or store, however old. No remote calls.
    #[default]
    Cached,
    /// Fetch from the remote API; fail if that fails.
    Fresh,
    /// Fetch from the remote API, falling back to stored orders on failure.
    FreshOrStale,
}

impl Freshness {
    /// Map CLI-style flags. `allow_stale` implies a refresh.
    #[must_use]
    pub const fn from_flags(refresh: bool, allow_stale: bool) -> Self {
        match (refresh, allow_stale) {
            (_, true) => Self::FreshOrStale,
            (true, false) => Self::Fresh,
            (false, false) => Self::Cached,
        }
    }

    #[must_use]
    pub const fn hits_remote(self) -> bool {
        !matches!(self, Self::Cached)
    }
}

/// Serves region orders from cache or store and refreshes them on demand.
///
/// Owns one [`ParallelPageFetcher`], and through it the single rate limiter
/// every remote request of this orchestrator passes.
pub struct IngestionOrchestrator<S> {
    cache: OrderCache,
    store: Arc<S>,
    fetcher: ParallelPageFetcher,
}

impl<S: OrderStore> IngestionOrchestrator<S> {
    #[must_use]
    pub fn new(cache: OrderCache, store: Arc<S>, fetcher: ParallelPageFetcher) -> Self {
        Self {
            cache,
            store,
            fetcher,
        }
    }

    #[must_use]
    pub fn cache(&self) -> &OrderCache {
        &self.cache
    }

    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    #[must_use]
    pub fn fetcher(&self) -> &ParallelPageFetcher {
        &self.fetcher
    }

    /// Current orders for `region` without touching the remote API.
    ///
    /// A cache miss falls through to the store; a non-empty store read
    /// repopulates the cache. The result may be stale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the store cannot be read.
    pub async fn get_orders(&self, region: RegionId) -> Result<Vec<MarketOrder>> {
        if let Some(orders) = self.cache.get(region).await {
            return Ok(orders);
        }

        let orders = self.store.get_all_orders_for_region(region).await?;
        debug!(region = %region, orders = orders.len(), "Served orders from store");
        if !orders.is_empty() {
            self.populate_cache(region, &orders).await;
        }
        Ok(orders)
    }

    /// Current orders of one item type in `region`, without remote calls.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the store cannot be read.
    pub async fn get_orders_for_type(
        &self,
        region: RegionId,
        type_id: TypeId,
    ) -> Result<Vec<MarketOrder>> {
        if let Some(orders) = self.cache.get(region).await {
            return Ok(filter_type(orders, type_id));
        }
        Ok(self.store.get_orders(region, type_id).await?)
    }

    /// Fetch every page of `region`, persist it, then cache it.
    ///
    /// Nothing is written to the store or the cache unless the whole fetch
    /// succeeded, and nothing is cached unless the store accepted it.
    ///
    /// # Errors
    ///
    /// - [`Error::Fetch`] if any page fails, the caller cancels or the
    ///   deadline passes
    /// - [`Error::Store`] if the upsert fails
    pub async fn refresh_orders(
        &self,
        region: RegionId,
        cancel: &CancellationToken,
    ) -> Result<Vec<MarketOrder>> {
        let orders = self.fetcher.fetch_all_pages(region, cancel).await?;
        self.store.upsert_orders(&orders).await?;
        self.populate_cache(region, &orders).await;
        info!(region = %region, orders = orders.len(), "Refreshed region orders");
        Ok(orders)
    }

    /// Refresh `region`, serving last-known-good stored orders if that fails.
    ///
    /// Cancellation is not a failure to paper over and is returned as is.
    ///
    /// # Errors
    ///
    /// Returns the refresh error when it was a cancellation, or when the
    /// store has nothing for the region or cannot be read.
    pub async fn refresh_or_stale(
        &self,
        region: RegionId,
        cancel: &CancellationToken,
    ) -> Result<Vec<MarketOrder>> {
        let err = match self.refresh_orders(region, cancel).await {
            Ok(orders) => return Ok(orders),
            Err(err) => err,
        };
        if matches!(&err, Error::Fetch(fetch) if fetch.is_cancellation()) {
            return Err(err);
        }

        match self.store.get_all_orders_for_region(region).await {
            Ok(stale) if !stale.is_empty() => {
                warn!(
                    region = %region,
                    orders = stale.len(),
                    error = %err,
                    "Refresh failed, serving stale stored orders"
                );
                Ok(stale)
            }
            Ok(_) => Err(err),
            Err(store_err) => {
                warn!(region = %region, error = %store_err, "Stale fallback unavailable");
                Err(err)
            }
        }
    }

    /// Orders for `region` at the requested freshness.
    ///
    /// # Errors
    ///
    /// See [`Self::get_orders`], [`Self::refresh_orders`] and
    /// [`Self::refresh_or_stale`].
    pub async fn fetch(
        &self,
        region: RegionId,
        freshness: Freshness,
        cancel: &CancellationToken,
    ) -> Result<Vec<MarketOrder>> {
        match freshness {
            Freshness::Cached => self.get_orders(region).await,
            Freshness::Fresh => self.refresh_orders(region, cancel).await,
            Freshness::FreshOrStale => self.refresh_or_stale(region, cancel).await,
        }
    }

    async fn populate_cache(&self, region: RegionId, orders: &[MarketOrder]) {
        if let Err(err) = self.cache.set(region, orders).await {
            warn!(region = %region, error = %err, "Failed to cache region orders");
        }
    }
}

fn filter_type(orders: Vec<MarketOrder>, type_id: TypeId) -> Vec<MarketOrder> {
    orders.into_iter().filter(|o| o.type_id == type_id).collect()
}
