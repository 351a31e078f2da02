//! Market order snapshot types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{LocationId, OrderId, RegionId, TypeId};

/// Side of the book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    #[must_use]
    pub const fn from_is_buy(is_buy_order: bool) -> Self {
        if is_buy_order {
            Self::Buy
        } else {
            Self::Sell
        }
    }

    #[must_use]
    pub const fn is_buy(self) -> bool {
        matches!(self, Self::Buy)
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// One order as observed at ingestion time.
///
/// Orders are immutable snapshots. A later fetch yields new values for the
/// same [`OrderId`]; whether those replace or append is the store's call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketOrder {
    pub order_id: OrderId,
    pub type_id: TypeId,
    pub region_id: RegionId,
    pub location_id: LocationId,
    pub system_id: i64,
    pub price: Decimal,
    pub volume_remain: i64,
    pub volume_total: i64,
    pub min_volume: i64,
    pub side: OrderSide,
    /// Order lifetime in days.
    pub duration: i32,
    /// Buy-order reach ("station", "region", jump count, ...).
    pub range: String,
    pub issued: DateTime<Utc>,
    /// When this snapshot was ingested locally.
    pub fetched_at: DateTime<Utc>,
}

impl MarketOrder {
    #[must_use]
    pub fn is_buy(&self) -> bool {
        self.side.is_buy()
    }

    /// Price times remaining volume.
    #[must_use]
    pub fn notional(&self) -> Decimal {
        self.price * Decimal::from(self.volume_remain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn side_from_flag() {
        assert_eq!(OrderSide::from_is_buy(true), OrderSide::Buy);
        assert_eq!(OrderSide::from_is_buy(false), OrderSide::Sell);
        assert_eq!(OrderSide::Sell.to_string(), "sell");
    }

    #[test]
    fn notional_multiplies_remaining_volume() {
        let mut order = crate::testkit::domain::order(1, 34, 10000002);
        order.price = dec!(4.25);
        order.volume_remain = 200;
        assert_eq!(order.notional(), dec!(850.00));
    }
}
