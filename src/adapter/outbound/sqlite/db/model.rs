//! Database model types for Diesel ORM.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use super::schema::market_orders;
use crate::domain::{LocationId, MarketOrder, OrderId, OrderSide, RegionId, TypeId};
use crate::error::StoreError;

/// Database row for a market order.
///
/// Prices are decimal text and timestamps RFC 3339 so nothing is lost to
/// SQLite's numeric affinity.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = market_orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderRow {
    pub order_id: i64,
    pub type_id: i64,
    pub region_id: i64,
    pub location_id: i64,
    pub system_id: i64,
    pub price: String,
    pub volume_remain: i64,
    pub volume_total: i64,
    pub min_volume: i64,
    pub is_buy_order: bool,
    pub duration: i32,
    pub order_range: String,
    pub issued: String,
    pub fetched_at: String,
}

impl From<&MarketOrder> for OrderRow {
    fn from(order: &MarketOrder) -> Self {
        Self {
            order_id: order.order_id.get(),
            type_id: order.type_id.get(),
            region_id: order.region_id.get(),
            location_id: order.location_id.get(),
            system_id: order.system_id,
            price: order.price.to_string(),
            volume_remain: order.volume_remain,
            volume_total: order.volume_total,
            min_volume: order.min_volume,
            is_buy_order: order.is_buy(),
            duration: order.duration,
            order_range: order.range.clone(),
            issued: order.issued.to_rfc3339(),
            fetched_at: order.fetched_at.to_rfc3339(),
        }
    }
}

fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("{field} {raw:?}: {e}")))
}

impl TryFrom<OrderRow> for MarketOrder {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let price: Decimal = row
            .price
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("price {:?}: {e}", row.price)))?;
        Ok(Self {
            order_id: OrderId::new(row.order_id),
            type_id: TypeId::new(row.type_id),
            region_id: RegionId::new(row.region_id),
            location_id: LocationId::new(row.location_id),
            system_id: row.system_id,
            price,
            volume_remain: row.volume_remain,
            volume_total: row.volume_total,
            min_volume: row.min_volume,
            side: OrderSide::from_is_buy(row.is_buy_order),
            duration: row.duration,
            range: row.order_range,
            issued: parse_timestamp("issued", &row.issued)?,
            fetched_at: parse_timestamp("fetched_at", &row.fetched_at)?,
        })
    }
}
