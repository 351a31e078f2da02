//! Pagination primitives for paginated region fetches.

use tracing::warn;

use super::id::RegionId;
use super::order::MarketOrder;

/// Orders per page served by the remote market endpoint.
pub const PAGE_SIZE: usize = 1000;

/// Largest page count a fetch will plan for. A reported count above this is
/// rejected instead of being fanned out.
pub const MAX_PAGES: u32 = 10_000;

/// The Forge: the one region whose size is hardcoded in the fallback table.
const THE_FORGE: RegionId = RegionId::new(10000002);
const THE_FORGE_PAGES: u32 = 383;

/// Coarse page count assumed for any other region with a full first page.
const FULL_REGION_DEFAULT_PAGES: u32 = 10;

/// A single unit of work for a page worker. Consumed exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub region: RegionId,
    pub page: u32,
}

impl PageRequest {
    #[must_use]
    pub const fn new(region: RegionId, page: u32) -> Self {
        Self { region, page }
    }
}

/// One page of orders as returned by the remote API.
#[derive(Debug, Clone, Default)]
pub struct OrderPage {
    pub orders: Vec<MarketOrder>,
    /// Total page count from the pagination header, when the remote sent one.
    pub total_pages: Option<u32>,
}

/// How many pages a region has, and how much we trust the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCount {
    /// Read from the authoritative pagination signal.
    Reported(u32),
    /// Produced by [`estimate_total_pages`]; approximate.
    Estimated(u32),
}

impl PageCount {
    /// Resolve the count from a first page, falling back to the estimate.
    #[must_use]
    pub fn from_first_page(region: RegionId, page: &OrderPage) -> Self {
        match page.total_pages {
            Some(total) => Self::Reported(total.max(1)),
            None => {
                let estimate = estimate_total_pages(region, page.orders.len());
                warn!(
                    region = %region,
                    first_page_len = page.orders.len(),
                    estimate,
                    "Pagination header missing, using estimated page count"
                );
                Self::Estimated(estimate)
            }
        }
    }

    #[must_use]
    pub const fn total(self) -> u32 {
        match self {
            Self::Reported(n) | Self::Estimated(n) => n,
        }
    }

    #[must_use]
    pub const fn is_estimated(self) -> bool {
        matches!(self, Self::Estimated(_))
    }
}

/// Degraded-mode page count when the pagination header is absent.
///
/// Deterministic but approximate: The Forge is pinned to 383 pages whatever
/// the first page looks like, a short first page means a single page, and a
/// full first page maps to a coarse default.
#[must_use]
pub fn estimate_total_pages(region: RegionId, first_page_len: usize) -> u32 {
    if region == THE_FORGE {
        return THE_FORGE_PAGES;
    }
    if first_page_len < PAGE_SIZE {
        return 1;
    }
    FULL_REGION_DEFAULT_PAGES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forge_estimate_ignores_first_page_size() {
        for len in [0, 1, 999, 1000] {
            assert_eq!(estimate_total_pages(RegionId::new(10000002), len), 383);
        }
    }

    #[test]
    fn short_first_page_is_single_page() {
        assert_eq!(estimate_total_pages(RegionId::new(10000043), 12), 1);
    }

    #[test]
    fn full_first_page_uses_coarse_default() {
        assert_eq!(estimate_total_pages(RegionId::new(10000043), PAGE_SIZE), 10);
    }

    #[test]
    fn reported_count_wins_over_estimate() {
        let page = OrderPage {
            orders: Vec::new(),
            total_pages: Some(7),
        };
        let count = PageCount::from_first_page(RegionId::new(10000002), &page);
        assert_eq!(count, PageCount::Reported(7));
        assert!(!count.is_estimated());
    }

    #[test]
    fn missing_header_falls_back_to_estimate() {
        let page = OrderPage::default();
        let count = PageCount::from_first_page(RegionId::new(10000002), &page);
        assert_eq!(count, PageCount::Estimated(383));
        assert_eq!(count.total(), 383);
    }

    #[test]
    fn reported_zero_is_clamped_to_one() {
        let page = OrderPage {
            orders: Vec::new(),
            total_pages: Some(0),
        };
        assert_eq!(
            PageCount::from_first_page(RegionId::new(1), &page).total(),
            1
        );
    }
}
