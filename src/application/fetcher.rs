//! Parallel paginated fetch of one region's order book.
//!
//! Page 1 is fetched inline to learn the page count. Pages 2..N are claimed
//! from a shared cursor by a fixed pool of workers that share the
//! orchestrator's [`RateLimiter`]. The result is all pages or an error; a
//! partially merged collection never leaves this module.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::limiter::RateLimiter;
use super::retry::RetryPolicy;
use crate::domain::{MarketOrder, OrderPage, PageCount, PageRequest, RegionId, MAX_PAGES};
use crate::error::{CallError, Cancelled, FetchError, RetryError};
use crate::infrastructure::config::ingestion::FetcherConfig;
use crate::port::MarketApi;

type PageOutcome = Result<OrderPage, FetchError>;

/// Fetches every page of a region through a bounded worker pool.
///
/// Cheap to clone; clones share the market API handle and the rate limiter.
#[derive(Clone)]
pub struct ParallelPageFetcher {
    api: Arc<dyn MarketApi>,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
    workers: usize,
    fetch_timeout: Duration,
}

impl ParallelPageFetcher {
    #[must_use]
    pub fn new(
        api: Arc<dyn MarketApi>,
        limiter: Arc<RateLimiter>,
        retry: RetryPolicy,
        config: &FetcherConfig,
    ) -> Self {
        Self {
            api,
            limiter,
            retry,
            workers: config.workers.max(1),
            fetch_timeout: config.fetch_timeout(),
        }
    }

    /// The limiter every request of this fetcher is admitted through.
    #[must_use]
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Name of the market API behind this fetcher.
    #[must_use]
    pub fn source_name(&self) -> &'static str {
        self.api.source_name()
    }

    /// Fetch and merge all pages of `region`.
    ///
    /// Runs under the configured per-fetch deadline. Cancelling `cancel`, or
    /// dropping the returned future, stops every worker of this fetch.
    ///
    /// # Errors
    ///
    /// - [`FetchError::FirstPage`] if page 1 fails; no workers are started
    /// - [`FetchError::TooManyPages`] if the remote reports more than
    ///   [`MAX_PAGES`] pages
    /// - [`FetchError::Worker`] for the first page that fails after it
    /// - [`FetchError::Cancelled`] / [`FetchError::DeadlineExceeded`] when
    ///   the caller cancels or the deadline passes
    pub async fn fetch_all_pages(
        &self,
        region: RegionId,
        cancel: &CancellationToken,
    ) -> Result<Vec<MarketOrder>, FetchError> {
        let scope = cancel.child_token();
        let _guard = scope.clone().drop_guard();
        let started = Instant::now();

        info!(region = %region, source = self.api.source_name(), "Fetching region orders");
        let result = tokio::select! {
            biased;
            result = self.fetch_pages(region, &scope) => result,
            () = sleep(self.fetch_timeout) => {
                scope.cancel();
                Err(FetchError::DeadlineExceeded { region, timeout: self.fetch_timeout })
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(orders) => info!(
                region = %region,
                orders = orders.len(),
                elapsed_ms,
                "Fetched region orders"
            ),
            Err(err) if err.is_cancellation() => {
                warn!(region = %region, elapsed_ms, error = %err, "Region fetch cancelled");
            }
            Err(err) => error!(region = %region, elapsed_ms, error = %err, "Region fetch failed"),
        }
        result
    }

    async fn fetch_pages(
        &self,
        region: RegionId,
        scope: &CancellationToken,
    ) -> Result<Vec<MarketOrder>, FetchError> {
        let first = self
            .fetch_page(PageRequest::new(region, 1), scope)
            .await
            .map_err(|source| match source {
                RetryError::Cancelled => FetchError::Cancelled { region },
                source => FetchError::FirstPage { region, source },
            })?;

        let count = PageCount::from_first_page(region, &first);
        let total = count.total();
        if total > MAX_PAGES {
            warn!(region = %region, total, limit = MAX_PAGES, "Rejecting implausible page count");
            return Err(FetchError::TooManyPages {
                region,
                reported: total,
                limit: MAX_PAGES,
            });
        }
        if total <= 1 {
            return Ok(first.orders);
        }

        let cursor = Arc::new(AtomicU32::new(2));
        let worker_count = self.workers.min((total - 1) as usize);
        debug!(region = %region, total, workers = worker_count, "Starting page workers");

        let (results, mut outcomes) = mpsc::channel::<PageOutcome>(worker_count);
        let mut pool = JoinSet::new();
        for id in 0..worker_count {
            let worker = PageWorker {
                id,
                fetcher: self.clone(),
                region,
                count,
                cursor: cursor.clone(),
                results: results.clone(),
                scope: scope.clone(),
            };
            pool.spawn(worker.run());
        }
        drop(results);

        let mut merged = first.orders;
        let mut remaining = total - 1;

        while remaining > 0 {
            let outcome = tokio::select! {
                biased;
                () = scope.cancelled() => break,
                outcome = outcomes.recv() => outcome,
            };
            match outcome {
                Some(Ok(page)) => {
                    remaining -= 1;
                    merged.extend(page.orders);
                }
                Some(Err(err)) => {
                    scope.cancel();
                    let drained = drain(&mut outcomes);
                    debug!(region = %region, drained, "Cancelled page workers after failure");
                    pool.detach_all();
                    return Err(err);
                }
                None => break,
            }
        }

        if remaining > 0 {
            let cancelled = scope.is_cancelled();
            scope.cancel();
            drain(&mut outcomes);
            pool.detach_all();
            return Err(if cancelled {
                FetchError::Cancelled { region }
            } else {
                FetchError::Incomplete {
                    region,
                    missing: remaining,
                }
            });
        }

        while pool.join_next().await.is_some() {}
        Ok(merged)
    }

    /// One page through the limiter and the retry policy.
    async fn fetch_page(
        &self,
        request: PageRequest,
        cancel: &CancellationToken,
    ) -> Result<OrderPage, RetryError> {
        self.retry
            .run(cancel, || async move {
                if let Err(cancelled) = self.limiter.wait(cancel).await {
                    return Err(CallError::from(cancelled));
                }
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => Err(CallError::Cancelled(Cancelled)),
                    page = self.api.fetch_page(request) => page.map_err(CallError::from),
                }
            })
            .await
    }
}

/// Discard whatever is already buffered without waiting for more.
fn drain(outcomes: &mut mpsc::Receiver<PageOutcome>) -> usize {
    let mut drained = 0;
    while outcomes.try_recv().is_ok() {
        drained += 1;
    }
    outcomes.close();
    drained
}

struct PageWorker {
    id: usize,
    fetcher: ParallelPageFetcher,
    region: RegionId,
    count: PageCount,
    /// Next unclaimed page number.
    cursor: Arc<AtomicU32>,
    results: mpsc::Sender<PageOutcome>,
    scope: CancellationToken,
}

impl PageWorker {
    async fn run(self) {
        loop {
            if self.scope.is_cancelled() {
                break;
            }
            let page = self.cursor.fetch_add(1, Ordering::Relaxed);
            if page > self.count.total() {
                break;
            }
            let request = PageRequest::new(self.region, page);

            let outcome = match self.fetcher.fetch_page(request, &self.scope).await {
                Ok(page) => Ok(page),
                Err(RetryError::Cancelled) => break,
                Err(RetryError::Fatal(err)) if self.count.is_estimated() && err.is_not_found() => {
                    debug!(
                        region = %request.region,
                        page = request.page,
                        "Estimated page beyond last page, treating as empty"
                    );
                    Ok(OrderPage::default())
                }
                Err(source) => Err(FetchError::Worker {
                    region: request.region,
                    page: request.page,
                    source,
                }),
            };

            let failed = outcome.is_err();
            tokio::select! {
                biased;
                () = self.scope.cancelled() => break,
                sent = self.results.send(outcome) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }
            if failed {
                break;
            }
        }
        debug!(worker = self.id, "Page worker exiting");
    }
}
