//! In-memory [`OrderStore`] with call counters and failure switches.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use parking_lot::RwLock;

use crate::domain::{MarketOrder, OrderId, RegionId, TypeId};
use crate::error::StoreError;
use crate::port::OrderStore;

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<BTreeMap<OrderId, MarketOrder>>,
    reads: AtomicU32,
    upserts: AtomicU32,
    fail_reads: AtomicBool,
    fail_upserts: AtomicBool,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `orders`; seeding does not count as an upsert.
    pub fn seeded(orders: Vec<MarketOrder>) -> Self {
        let store = Self::new();
        store
            .orders
            .write()
            .extend(orders.into_iter().map(|o| (o.order_id, o)));
        store
    }

    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn upserts(&self) -> u32 {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.fail_reads.store(unreachable, Ordering::SeqCst);
        self.fail_upserts.store(unreachable, Ordering::SeqCst);
    }

    pub fn fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("store unreachable".into()));
        }
        Ok(())
    }
}

impl OrderStore for MemoryOrderStore {
    async fn get_all_orders_for_region(
        &self,
        region: RegionId,
    ) -> Result<Vec<MarketOrder>, StoreError> {
        self.check_read()?;
        Ok(self
            .orders
            .read()
            .values()
            .filter(|o| o.region_id == region)
            .cloned()
            .collect())
    }

    async fn get_orders(
        &self,
        region: RegionId,
        type_id: TypeId,
    ) -> Result<Vec<MarketOrder>, StoreError> {
        self.check_read()?;
        Ok(self
            .orders
            .read()
            .values()
            .filter(|o| o.region_id == region && o.type_id == type_id)
            .cloned()
            .collect())
    }

    async fn upsert_orders(&self, orders: &[MarketOrder]) -> Result<(), StoreError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(StoreError::Query("upsert rejected".into()));
        }
        let mut stored = self.orders.write();
        for order in orders {
            stored.insert(order.order_id, order.clone());
        }
        Ok(())
    }
}
