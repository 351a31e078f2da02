//! ESI REST client for regional market orders.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::HeaderMap;
use reqwest::Client as HttpClient;
use tracing::{debug, trace};
use url::Url;

use super::dto::EsiOrder;
use super::settings::EsiConfig;
use crate::domain::{OrderPage, PageRequest, RegionId};
use crate::error::{RemoteError, Result};
use crate::port::MarketApi;

/// Response header carrying the authoritative page count.
pub const PAGES_HEADER: &str = "x-pages";

/// HTTP client for `GET /v1/markets/{region_id}/orders/`.
///
/// One call fetches one page. Retrying, pacing and page fan-out belong to
/// the caller; this client only maps the response.
pub struct EsiClient {
    http: HttpClient,
    base_url: Url,
}

impl EsiClient {
    /// Build a client from the `[esi]` section.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL or the HTTP client
    /// cannot be constructed.
    pub fn from_config(config: &EsiConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()?;
        Ok(Self {
            http,
            base_url: normalize_base(&config.base_url)?,
        })
    }

    /// Absolute URL of one page of a region's orders.
    ///
    /// # Errors
    ///
    /// Returns a URL error only if the base cannot be joined, which a
    /// normalized base never triggers.
    pub fn page_url(&self, region: RegionId, page: u32) -> std::result::Result<Url, url::ParseError> {
        let mut url = self
            .base_url
            .join(&format!("v1/markets/{region}/orders/"))?;
        url.query_pairs_mut().append_pair("page", &page.to_string());
        Ok(url)
    }
}

fn normalize_base(raw: &str) -> std::result::Result<Url, url::ParseError> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(&format!("{trimmed}/"))
}

/// Page count from the response headers, if present and well formed.
fn parse_page_count(headers: &HeaderMap) -> Option<u32> {
    headers
        .get(PAGES_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|pages| *pages > 0)
}

#[async_trait]
impl MarketApi for EsiClient {
    async fn fetch_page(&self, request: PageRequest) -> std::result::Result<OrderPage, RemoteError> {
        let url = self
            .page_url(request.region, request.page)
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        trace!(url = %url, "Requesting order page");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(
                region = %request.region,
                page = request.page,
                status = status.as_u16(),
                "ESI returned non-success status"
            );
            return Err(RemoteError::from_status(status.as_u16()));
        }

        let total_pages = parse_page_count(response.headers());
        let body: Vec<EsiOrder> = response.json().await?;
        let fetched_at = Utc::now();
        let orders = body
            .into_iter()
            .map(|order| order.into_order(request.region, fetched_at))
            .collect::<Vec<_>>();

        debug!(
            region = %request.region,
            page = request.page,
            orders = orders.len(),
            total_pages = ?total_pages,
            "Fetched order page"
        );
        Ok(OrderPage {
            orders,
            total_pages,
        })
    }

    fn source_name(&self) -> &'static str {
        "esi"
    }
}
