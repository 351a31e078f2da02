//! Orchestrators over scripted remotes with real or in-memory stores.

use std::sync::Arc;

use marketsync::adapter::outbound::memory::MemoryCacheBackend;
use marketsync::adapter::outbound::sqlite::{create_pool, run_migrations, SqliteOrderStore};
use marketsync::application::IngestionOrchestrator;
use marketsync::infrastructure::bootstrap::assemble;
use marketsync::infrastructure::config::settings::Config;
use marketsync::port::OrderStore;
use marketsync::testkit::config as test_config;
use marketsync::testkit::market::ScriptedMarketApi;
use tempfile::TempDir;

/// Defaults with short backoffs and `workers` page workers.
pub fn config(workers: usize) -> Config {
    Config {
        retry: test_config::retry(),
        fetcher: test_config::fetcher(workers),
        ..Config::default()
    }
}

/// SQLite store in a file under `dir`; stores opened on the same dir share data.
pub fn sqlite_store(dir: &TempDir) -> Arc<SqliteOrderStore> {
    let path = dir.path().join("orders.db");
    let pool = create_pool(path.to_str().expect("utf-8 temp path")).expect("create pool");
    run_migrations(&pool).expect("run migrations");
    Arc::new(SqliteOrderStore::new(pool))
}

/// Orchestrator over `api` and `store` with a fresh in-process cache.
pub fn orchestrator<S: OrderStore>(
    api: &Arc<ScriptedMarketApi>,
    store: &Arc<S>,
    workers: usize,
) -> IngestionOrchestrator<S> {
    assemble(
        &config(workers),
        api.clone(),
        store.clone(),
        Arc::new(MemoryCacheBackend::new()),
    )
}
