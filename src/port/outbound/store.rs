//! Persistence port for ingested orders.

use std::future::Future;

use crate::domain::{MarketOrder, RegionId, TypeId};
use crate::error::StoreError;

/// Source of truth for the last successfully ingested snapshot of each region.
pub trait OrderStore: Send + Sync {
    /// All stored orders for a region. Empty when the region was never ingested.
    fn get_all_orders_for_region(
        &self,
        region: RegionId,
    ) -> impl Future<Output = Result<Vec<MarketOrder>, StoreError>> + Send;

    /// Stored orders for one item type in a region.
    fn get_orders(
        &self,
        region: RegionId,
        type_id: TypeId,
    ) -> impl Future<Output = Result<Vec<MarketOrder>, StoreError>> + Send;

    /// Insert or replace orders by order id. Idempotent.
    fn upsert_orders(
        &self,
        orders: &[MarketOrder],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
