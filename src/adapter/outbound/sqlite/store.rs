//! SQLite order store implementation.

use diesel::prelude::*;
use tracing::debug;

use super::db::connection::DbPool;
use super::db::model::OrderRow;
use super::db::schema::market_orders;
use crate::domain::{MarketOrder, RegionId, TypeId};
use crate::error::StoreError;
use crate::port::OrderStore;

/// Rows per `REPLACE INTO` statement; keeps bound parameters well under
/// SQLite's variable limit.
const UPSERT_CHUNK: usize = 500;

/// SQLite-backed [`OrderStore`].
///
/// Diesel calls are synchronous, so each operation runs on the blocking pool
/// with its own pooled connection.
#[derive(Clone)]
pub struct SqliteOrderStore {
    pool: DbPool,
}

impl SqliteOrderStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn with_conn<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, StoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            op(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Query(format!("store task failed: {e}")))?
    }
}

fn into_orders(rows: Vec<OrderRow>) -> Result<Vec<MarketOrder>, StoreError> {
    rows.into_iter().map(MarketOrder::try_from).collect()
}

impl OrderStore for SqliteOrderStore {
    async fn get_all_orders_for_region(
        &self,
        region: RegionId,
    ) -> Result<Vec<MarketOrder>, StoreError> {
        let rows = self
            .with_conn(move |conn| {
                market_orders::table
                    .filter(market_orders::region_id.eq(region.get()))
                    .order(market_orders::order_id.asc())
                    .select(OrderRow::as_select())
                    .load(conn)
                    .map_err(|e| StoreError::Query(e.to_string()))
            })
            .await?;
        into_orders(rows)
    }

    async fn get_orders(
        &self,
        region: RegionId,
        type_id: TypeId,
    ) -> Result<Vec<MarketOrder>, StoreError> {
        let rows = self
            .with_conn(move |conn| {
                market_orders::table
                    .filter(market_orders::region_id.eq(region.get()))
                    .filter(market_orders::type_id.eq(type_id.get()))
                    .order(market_orders::order_id.asc())
                    .select(OrderRow::as_select())
                    .load(conn)
                    .map_err(|e| StoreError::Query(e.to_string()))
            })
            .await?;
        into_orders(rows)
    }

    async fn upsert_orders(&self, orders: &[MarketOrder]) -> Result<(), StoreError> {
        if orders.is_empty() {
            return Ok(());
        }
        let rows: Vec<OrderRow> = orders.iter().map(OrderRow::from).collect();
        let count = rows.len();
        self.with_conn(move |conn| {
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                for chunk in rows.chunks(UPSERT_CHUNK) {
                    diesel::replace_into(market_orders::table)
                        .values(chunk)
                        .execute(conn)?;
                }
                Ok(())
            })
            .map_err(|e| StoreError::Query(e.to_string()))
        })
        .await?;
        debug!(orders = count, "Upserted orders");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::db::connection::{create_pool, run_migrations};
    use crate::testkit::domain;
    use rust_decimal_macros::dec;

    const FORGE: i64 = 10000002;
    const DOMAIN: i64 = 10000043;

    fn store() -> SqliteOrderStore {
        let pool = create_pool(":memory:").unwrap();
        run_migrations(&pool).unwrap();
        SqliteOrderStore::new(pool)
    }

    #[tokio::test]
    async fn upsert_then_read_by_region_and_type() {
        let store = store();
        let mut orders = domain::orders(1, 4, 34, FORGE);
        orders.extend(domain::orders(100, 2, 35, FORGE));
        orders.extend(domain::orders(200, 3, 34, DOMAIN));

        store.upsert_orders(&orders).await.unwrap();

        let forge = store
            .get_all_orders_for_region(RegionId::new(FORGE))
            .await
            .unwrap();
        assert_eq!(forge.len(), 6);
        assert_eq!(forge[0], orders[0]);

        let tritanium = store
            .get_orders(RegionId::new(FORGE), TypeId::new(34))
            .await
            .unwrap();
        assert_eq!(tritanium.len(), 4);
        assert!(tritanium.iter().all(|o| o.type_id == TypeId::new(34)));
    }

    #[tokio::test]
    async fn upsert_is_idempotent_by_order_id() {
        let store = store();
        let mut orders = domain::orders(1, 3, 34, FORGE);
        store.upsert_orders(&orders).await.unwrap();

        orders[1].price = dec!(9.99);
        store.upsert_orders(&orders).await.unwrap();

        let stored = store
            .get_all_orders_for_region(RegionId::new(FORGE))
            .await
            .unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[1].price, dec!(9.99));
    }

    #[tokio::test]
    async fn upsert_spans_multiple_chunks() {
        let store = store();
        let orders = domain::orders(1, UPSERT_CHUNK * 2 + 7, 34, FORGE);
        store.upsert_orders(&orders).await.unwrap();

        let stored = store
            .get_all_orders_for_region(RegionId::new(FORGE))
            .await
            .unwrap();
        assert_eq!(stored.len(), orders.len());
    }

    #[tokio::test]
    async fn empty_region_reads_empty() {
        let store = store();
        let stored = store
            .get_all_orders_for_region(RegionId::new(DOMAIN))
            .await
            .unwrap();
        assert!(stored.is_empty());
        store.upsert_orders(&[]).await.unwrap();
    }
}
