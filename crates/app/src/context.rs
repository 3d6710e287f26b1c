//! App Context

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::{
    database::{self, Db},
    domain::{
        orders::{OrdersService, OrdersServiceError, PgOrdersService, data::CheckoutPolicy},
        vendors::{PgVendorsService, VendorsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to run database migrations")]
    Migrations(#[source] sqlx::migrate::MigrateError),

    #[error("failed to backfill searchable order ids")]
    Backfill(#[source] OrdersServiceError),
}

#[derive(Clone)]
pub struct AppContext {
    pub orders: Arc<dyn OrdersService>,
    pub vendors: Arc<dyn VendorsService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting fails, or when [`AppContext::from_pool`] does.
    pub async fn from_database_url(url: &str, policy: CheckoutPolicy) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Self::from_pool(pool, policy).await
    }

    /// Build application context on an existing pool. Pending migrations are applied and any
    /// order still missing a searchable id is given one, so the column is always required.
    ///
    /// # Errors
    ///
    /// Returns an error when migrating or the searchable id backfill fails.
    pub async fn from_pool(pool: PgPool, policy: CheckoutPolicy) -> Result<Self, AppInitError> {
        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrations)?;

        let db = Db::new(pool);
        let orders = PgOrdersService::new(db.clone(), policy);

        let report = orders
            .backfill_searchable_ids()
            .await
            .map_err(AppInitError::Backfill)?;

        info!(assigned = report.assigned, "app.searchable_ids_ready");

        Ok(Self {
            orders: Arc::new(orders),
            vendors: Arc::new(PgVendorsService::new(db)),
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestDb;

    use super::*;

    #[tokio::test]
    async fn startup_backfills_and_requires_searchable_ids() -> TestResult {
        let test_db = TestDb::new().await;
        let vendor = uuid::Uuid::now_v7();
        let order = uuid::Uuid::now_v7();

        sqlx::query("INSERT INTO vendors (uuid, store_name, delivery_fee) VALUES ($1, 'Thai', 500)")
            .bind(vendor)
            .execute(test_db.pool())
            .await?;

        sqlx::query(
            "INSERT INTO orders (uuid, customer_name, customer_phone, delivery_address, \
             delivery_mode, delivery_date, delivery_time, subtotal, tax, total_delivery_fee, \
             grand_total, created_at) \
             VALUES ($1, 'Ada', '555-0100', '12 Analytical Way', 'pickup', '2024-06-15', \
             '13:30', 1200, 96, 0, 1296, '2024-06-15T12:00:00Z')",
        )
        .bind(order)
        .execute(test_db.pool())
        .await?;

        AppContext::from_pool(test_db.pool().clone(), CheckoutPolicy::default()).await?;

        let nullable: String = sqlx::query_scalar(
            "SELECT is_nullable FROM information_schema.columns \
             WHERE table_name = 'orders' AND column_name = 'searchable_order_id'",
        )
        .fetch_one(test_db.pool())
        .await?;

        let searchable: Option<i64> =
            sqlx::query_scalar("SELECT searchable_order_id FROM orders WHERE uuid = $1")
                .bind(order)
                .fetch_one(test_db.pool())
                .await?;

        assert_eq!(nullable, "NO");
        assert!(searchable.is_some_and(|id| id >= 1_718_452_800_000));

        AppContext::from_pool(test_db.pool().clone(), CheckoutPolicy::default()).await?;

        let rerun: Option<i64> =
            sqlx::query_scalar("SELECT searchable_order_id FROM orders WHERE uuid = $1")
                .bind(order)
                .fetch_one(test_db.pool())
                .await?;

        assert_eq!(rerun, searchable, "a second start-up changes nothing");

        Ok(())
    }
}
