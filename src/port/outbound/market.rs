//! Remote market API port.

use async_trait::async_trait;

use crate::domain::{OrderPage, PageRequest};
use crate::error::RemoteError;

/// Read-only access to one page of a region's order book.
///
/// Implementations perform exactly one remote request per call. Admission
/// control and retries are layered on top by the application.
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// Fetch a single page.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] classified by the remote's response.
    async fn fetch_page(&self, request: PageRequest) -> Result<OrderPage, RemoteError>;

    /// Name used in logs.
    fn source_name(&self) -> &'static str;
}
