//! Builders for domain primitives used across tests.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use crate::domain::{LocationId, MarketOrder, OrderId, OrderSide, RegionId, TypeId};

/// Jita 4-4, the default location for built orders.
pub const JITA_STATION: i64 = 60003760;

/// A sell order with deterministic values derived from `id`.
pub fn order(id: i64, type_id: i64, region: i64) -> MarketOrder {
    let issued = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
    MarketOrder {
        order_id: OrderId::new(id),
        type_id: TypeId::new(type_id),
        region_id: RegionId::new(region),
        location_id: LocationId::new(JITA_STATION),
        system_id: 30000142,
        price: Decimal::new(100 + (id % 1000), 2),
        volume_remain: 10 + id % 90,
        volume_total: 100,
        min_volume: 1,
        side: if id % 2 == 0 { OrderSide::Sell } else { OrderSide::Buy },
        duration: 90,
        range: "region".into(),
        issued,
        fetched_at: issued,
    }
}

/// `n` orders with ids `start..start + n` in one region.
pub fn orders(start: i64, n: usize, type_id: i64, region: i64) -> Vec<MarketOrder> {
    (0..n as i64).map(|i| order(start + i, type_id, region)).collect()
}
