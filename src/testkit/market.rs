//! Scripted [`MarketApi`] for fetcher and orchestrator tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::domain;
use crate::domain::{OrderPage, PageRequest};
use crate::error::RemoteError;
use crate::port::MarketApi;

/// Serves `pages` pages of `per_page` orders each for any region.
///
/// Order ids are `page * 100_000 + index`, so every order across every page
/// is unique. Pages past the last one answer 404 like the real endpoint.
pub struct ScriptedMarketApi {
    pages: u32,
    per_page: usize,
    report_pages: bool,
    latency: Duration,
    jitter: bool,
    failures: HashMap<u32, RemoteError>,
    throttled: HashMap<u32, u32>,
    calls: Mutex<HashMap<u32, u32>>,
    total_calls: AtomicU32,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedMarketApi {
    pub fn new(pages: u32, per_page: usize) -> Self {
        Self {
            pages,
            per_page,
            report_pages: true,
            latency: Duration::ZERO,
            jitter: false,
            failures: HashMap::new(),
            throttled: HashMap::new(),
            calls: Mutex::new(HashMap::new()),
            total_calls: AtomicU32::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Omit the page-count header from every response.
    pub fn without_page_header(mut self) -> Self {
        self.report_pages = false;
        self
    }

    /// Delay every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Vary per-page latency so pages complete out of order.
    pub fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }

    /// Fail every request for `page` with `error`.
    pub fn fail_page(mut self, page: u32, error: RemoteError) -> Self {
        self.failures.insert(page, error);
        self
    }

    /// Throttle the first `times` requests for `page`.
    pub fn throttle_page(mut self, page: u32, times: u32) -> Self {
        self.throttled.insert(page, times);
        self
    }

    pub fn total_calls(&self) -> u32 {
        self.total_calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, page: u32) -> u32 {
        self.calls.lock().get(&page).copied().unwrap_or(0)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn page_latency(&self, page: u32) -> Duration {
        if self.jitter {
            self.latency + Duration::from_millis(u64::from((page * 7) % 11))
        } else {
            self.latency
        }
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MarketApi for ScriptedMarketApi {
    async fn fetch_page(&self, request: PageRequest) -> Result<OrderPage, RemoteError> {
        let attempt = {
            let mut calls = self.calls.lock();
            let count = calls.entry(request.page).or_insert(0);
            *count += 1;
            *count
        };
        self.total_calls.fetch_add(1, Ordering::SeqCst);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        let latency = self.page_latency(request.page);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if request.page == 0 || request.page > self.pages {
            return Err(RemoteError::from_status(404));
        }
        if let Some(error) = self.failures.get(&request.page) {
            return Err(error.clone());
        }
        if self
            .throttled
            .get(&request.page)
            .is_some_and(|times| attempt <= *times)
        {
            return Err(RemoteError::Throttled { status: 429 });
        }

        let base = i64::from(request.page) * 100_000;
        let orders = (0..self.per_page as i64)
            .map(|i| domain::order(base + i, 34 + i % 5, request.region.get()))
            .collect();
        Ok(OrderPage {
            orders,
            total_pages: self.report_pages.then_some(self.pages),
        })
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}
