//! End-to-end ingestion through the orchestrator.

mod support;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use marketsync::domain::{OrderId, RegionId};
use marketsync::error::{Error, FetchError, RemoteError};
use marketsync::port::OrderStore;
use marketsync::testkit::market::ScriptedMarketApi;
use marketsync::testkit::store::MemoryOrderStore;
use support::pipeline;
use tokio_util::sync::CancellationToken;

const FORGE: RegionId = RegionId::new(10000002);
const DOMAIN: RegionId = RegionId::new(10000043);

#[tokio::test]
async fn refresh_persists_every_page_to_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let store = pipeline::sqlite_store(&dir);
    let api = Arc::new(ScriptedMarketApi::new(6, 25));
    let orchestrator = pipeline::orchestrator(&api, &store, 4);

    let orders = orchestrator
        .refresh_orders(DOMAIN, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(orders.len(), 150);

    let stored = store.get_all_orders_for_region(DOMAIN).await.unwrap();
    let ids: HashSet<OrderId> = stored.iter().map(|o| o.order_id).collect();
    assert_eq!(stored.len(), 150);
    assert_eq!(ids.len(), 150);
    assert_eq!(api.total_calls(), 6);
}

#[tokio::test]
async fn restarted_process_serves_stored_orders_without_remote_calls() {
    let dir = tempfile::tempdir().unwrap();
    let first_api = Arc::new(ScriptedMarketApi::new(3, 10));
    let first = pipeline::orchestrator(&first_api, &pipeline::sqlite_store(&dir), 2);
    first
        .refresh_orders(DOMAIN, &CancellationToken::new())
        .await
        .unwrap();

    let second_api = Arc::new(ScriptedMarketApi::new(3, 10));
    let second = pipeline::orchestrator(&second_api, &pipeline::sqlite_store(&dir), 2);

    let served = second.get_orders(DOMAIN).await.unwrap();
    assert_eq!(served.len(), 30);
    assert_eq!(second_api.total_calls(), 0);
}

#[tokio::test]
async fn failed_refresh_keeps_last_good_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let store = pipeline::sqlite_store(&dir);
    let good = Arc::new(ScriptedMarketApi::new(3, 10));
    pipeline::orchestrator(&good, &store, 2)
        .refresh_orders(DOMAIN, &CancellationToken::new())
        .await
        .unwrap();

    let failing = Arc::new(
        ScriptedMarketApi::new(5, 10).fail_page(4, RemoteError::from_status(500)),
    );
    let orchestrator = pipeline::orchestrator(&failing, &store, 2);
    let cancel = CancellationToken::new();

    let err = orchestrator.refresh_orders(DOMAIN, &cancel).await.unwrap_err();
    assert!(matches!(err, Error::Fetch(FetchError::Worker { page: 4, .. })));
    assert_eq!(store.get_all_orders_for_region(DOMAIN).await.unwrap().len(), 30);

    let stale = orchestrator.refresh_or_stale(DOMAIN, &cancel).await.unwrap();
    assert_eq!(stale.len(), 30);
}

#[tokio::test]
async fn forge_without_page_header_walks_estimated_pages() {
    let store = Arc::new(MemoryOrderStore::new());
    let api = Arc::new(ScriptedMarketApi::new(5, 1000).without_page_header());
    let orchestrator = pipeline::orchestrator(&api, &store, 10);

    let orders = orchestrator
        .refresh_orders(FORGE, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(orders.len(), 5000);
    assert_eq!(api.total_calls(), 383);
    assert_eq!(api.calls_for(383), 1);
}

#[tokio::test(start_paused = true)]
async fn throttled_pages_recover_without_losing_orders() {
    let store = Arc::new(MemoryOrderStore::new());
    let api = Arc::new(ScriptedMarketApi::new(4, 10).throttle_page(3, 2));
    let orchestrator = pipeline::orchestrator(&api, &store, 3);

    let orders = orchestrator
        .refresh_orders(DOMAIN, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(orders.len(), 40);
    assert_eq!(api.calls_for(3), 3);
    assert_eq!(store.len(), 40);
}

#[tokio::test]
async fn cancellation_stops_refresh_promptly_and_stores_nothing() {
    let store = Arc::new(MemoryOrderStore::new());
    let api = Arc::new(ScriptedMarketApi::new(50, 5).with_latency(Duration::from_millis(200)));
    let orchestrator = pipeline::orchestrator(&api, &store, 4);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = orchestrator.refresh_orders(DOMAIN, &cancel).await.unwrap_err();

    assert!(matches!(err, Error::Fetch(ref fetch) if fetch.is_cancellation()));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(api.total_calls() < 50);
    assert_eq!(store.upserts(), 0);
}
