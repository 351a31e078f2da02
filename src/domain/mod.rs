//! Domain types for regional market order ingestion.

pub mod id;
pub mod order;
pub mod page;

pub use id::{LocationId, OrderId, RegionId, TypeId};
pub use order::{MarketOrder, OrderSide};
pub use page::{estimate_total_pages, OrderPage, PageCount, PageRequest, MAX_PAGES, PAGE_SIZE};
