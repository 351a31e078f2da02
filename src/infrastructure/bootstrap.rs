//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::esi::EsiClient;
use crate::adapter::outbound::memory::MemoryCacheBackend;
use crate::adapter::outbound::sqlite::{create_pool, run_migrations, SqliteOrderStore};
use crate::application::cache::OrderCache;
use crate::application::fetcher::ParallelPageFetcher;
use crate::application::limiter::RateLimiter;
use crate::application::retry::RetryPolicy;
use crate::application::IngestionOrchestrator;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::{CacheBackend, MarketApi, OrderStore};

/// The orchestrator as the binary runs it.
pub type SqliteOrchestrator = IngestionOrchestrator<SqliteOrderStore>;

/// Open the configured database, run migrations and build a store.
///
/// # Errors
///
/// Returns an error if the pool cannot be created or migrations fail.
pub fn build_store(config: &Config) -> Result<SqliteOrderStore> {
    let pool = create_pool(&config.database)?;
    run_migrations(&pool)?;
    info!(database = %config.database, "Order store ready");
    Ok(SqliteOrderStore::new(pool))
}

/// Build the production orchestrator: ESI client, SQLite store, in-process
/// cache.
///
/// # Errors
///
/// Returns an error if the store or the HTTP client cannot be built.
pub fn build_orchestrator(config: &Config) -> Result<SqliteOrchestrator> {
    let store = Arc::new(build_store(config)?);
    let api: Arc<dyn MarketApi> = Arc::new(EsiClient::from_config(&config.esi)?);
    let cache: Arc<dyn CacheBackend> = Arc::new(MemoryCacheBackend::new());
    Ok(assemble(config, api, store, cache))
}

/// Wire an orchestrator around arbitrary adapters.
///
/// Creates the one rate limiter all of this orchestrator's requests share.
#[must_use]
pub fn assemble<S: OrderStore>(
    config: &Config,
    api: Arc<dyn MarketApi>,
    store: Arc<S>,
    cache: Arc<dyn CacheBackend>,
) -> IngestionOrchestrator<S> {
    let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));
    let fetcher = ParallelPageFetcher::new(
        api,
        limiter,
        RetryPolicy::from_config(&config.retry),
        &config.fetcher,
    );
    info!(
        source = fetcher.source_name(),
        workers = config.fetcher.workers,
        requests_per_second = config.rate_limit.requests_per_second,
        burst = config.rate_limit.burst,
        "Ingestion pipeline assembled"
    );
    IngestionOrchestrator::new(OrderCache::new(cache, &config.cache), store, fetcher)
}
