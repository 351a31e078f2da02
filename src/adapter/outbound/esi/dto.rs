//! ESI market order payload.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{LocationId, MarketOrder, OrderId, OrderSide, RegionId, TypeId};

/// One element of the `/markets/{region_id}/orders/` response array.
///
/// The region is implied by the request path and is not part of the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct EsiOrder {
    pub order_id: i64,
    pub type_id: i64,
    pub location_id: i64,
    pub system_id: i64,
    pub price: Decimal,
    pub volume_remain: i64,
    pub volume_total: i64,
    #[serde(default = "default_min_volume")]
    pub min_volume: i64,
    pub is_buy_order: bool,
    pub duration: i32,
    pub range: String,
    pub issued: DateTime<Utc>,
}

const fn default_min_volume() -> i64 {
    1
}

impl EsiOrder {
    #[must_use]
    pub fn into_order(self, region: RegionId, fetched_at: DateTime<Utc>) -> MarketOrder {
        MarketOrder {
            order_id: OrderId::new(self.order_id),
            type_id: TypeId::new(self.type_id),
            region_id: region,
            location_id: LocationId::new(self.location_id),
            system_id: self.system_id,
            price: self.price,
            volume_remain: self.volume_remain,
            volume_total: self.volume_total,
            min_volume: self.min_volume,
            side: OrderSide::from_is_buy(self.is_buy_order),
            duration: self.duration,
            range: self.range,
            issued: self.issued,
            fetched_at,
        }
    }
}
