//! Orders Repository

use dishpatch::{
    RoundedTotals, checkout::ContactDetails, schedule::DeliverySchedule,
};
use jiff::Timestamp;
use jiff_sqlx::{Date as SqlxDate, Time as SqlxTime, Timestamp as SqlxTimestamp};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::domain::orders::{
    records::{OrderRecord, OrderStatus, OrderUuid},
    search::SearchFilter,
};

const CREATE_ORDER_SQL: &str = include_str!("../sql/create_order.sql");
const GET_ORDER_SQL: &str = include_str!("../sql/get_order.sql");
const LIST_ORDERS_SQL: &str = include_str!("../sql/list_orders.sql");
const COUNT_ORDERS_SQL: &str = include_str!("../sql/count_orders.sql");
const LIST_ORDERS_MISSING_SEARCHABLE_ID_SQL: &str =
    include_str!("../sql/list_orders_missing_searchable_id.sql");
const ASSIGN_SEARCHABLE_ORDER_ID_SQL: &str = include_str!("../sql/assign_searchable_order_id.sql");
const REQUIRE_SEARCHABLE_ORDER_ID_SQL: &str =
    include_str!("../sql/require_searchable_order_id.sql");

/// An `orders` row without its vendor groups.
#[derive(Debug, Clone)]
pub(crate) struct OrderRow {
    pub uuid: OrderUuid,
    pub searchable_order_id: Option<i64>,
    pub customer_order_id: i64,
    pub status: OrderStatus,
    pub contact: ContactDetails,
    pub schedule: DeliverySchedule,
    pub totals: RoundedTotals,
    pub created_at: Timestamp,
}

impl OrderRow {
    pub(crate) fn into_record(self, groups: Vec<dishpatch::VendorCartGroup>) -> OrderRecord {
        OrderRecord {
            uuid: self.uuid,
            searchable_order_id: self.searchable_order_id,
            customer_order_id: self.customer_order_id,
            status: self.status,
            contact: self.contact,
            schedule: self.schedule,
            groups,
            totals: self.totals,
            created_at: self.created_at,
        }
    }
}

/// A legacy order still waiting for a searchable id.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UnassignedOrder {
    pub uuid: OrderUuid,
    pub created_at: Timestamp,
}

/// Values written to a new `orders` row.
#[derive(Debug)]
pub(crate) struct OrderInsert<'a> {
    pub uuid: OrderUuid,
    pub searchable_order_id: i64,
    pub status: OrderStatus,
    pub contact: &'a ContactDetails,
    pub schedule: &'a DeliverySchedule,
    pub totals: &'a RoundedTotals,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderInsert<'_>,
    ) -> Result<OrderRow, sqlx::Error> {
        query_as::<Postgres, OrderRow>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.searchable_order_id)
            .bind(order.status.as_str())
            .bind(&order.contact.name)
            .bind(&order.contact.phone)
            .bind(&order.contact.address)
            .bind(order.schedule.delivery_mode.as_str())
            .bind(SqlxDate::from(order.schedule.date))
            .bind(SqlxTime::from(order.schedule.time))
            .bind(to_i64("subtotal", order.totals.subtotal)?)
            .bind(to_i64("tax", order.totals.tax)?)
            .bind(to_i64("total_delivery_fee", order.totals.total_delivery_fee)?)
            .bind(to_i64("grand_total", order.totals.grand_total)?)
            .bind(SqlxTimestamp::from(order.created_at))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRow, sqlx::Error> {
        query_as::<Postgres, OrderRow>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        search: Option<&SearchFilter>,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OrderRow>, sqlx::Error> {
        query_as::<Postgres, OrderRow>(LIST_ORDERS_SQL)
            .bind(search.map(|filter| filter.pattern.as_str()))
            .bind(search.map_or(0, |filter| filter.searchable_order_id))
            .bind(status.map(OrderStatus::as_str))
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        search: Option<&SearchFilter>,
        status: Option<OrderStatus>,
    ) -> Result<i64, sqlx::Error> {
        query_scalar::<Postgres, i64>(COUNT_ORDERS_SQL)
            .bind(search.map(|filter| filter.pattern.as_str()))
            .bind(search.map_or(0, |filter| filter.searchable_order_id))
            .bind(status.map(OrderStatus::as_str))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_unassigned(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<UnassignedOrder>, sqlx::Error> {
        let rows: Vec<(Uuid, SqlxTimestamp)> =
            query_as(LIST_ORDERS_MISSING_SEARCHABLE_ID_SQL)
                .fetch_all(&mut **tx)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(uuid, created_at)| UnassignedOrder {
                uuid: OrderUuid::from_uuid(uuid),
                created_at: created_at.to_jiff(),
            })
            .collect())
    }

    /// Give `order` a searchable id if it has none. Returns whether the row was updated.
    pub(crate) async fn assign_searchable_order_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        searchable_order_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(ASSIGN_SEARCHABLE_ORDER_ID_SQL)
            .bind(order.into_uuid())
            .bind(searchable_order_id)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    pub(crate) async fn require_searchable_order_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<(), sqlx::Error> {
        query(REQUIRE_SEARCHABLE_ORDER_ID_SQL)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

pub(crate) fn to_i64(column: &str, value: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn to_u64(column: &str, value: i64) -> Result<u64, sqlx::Error> {
    u64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for OrderRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;
        let delivery_mode: String = row.try_get("delivery_mode")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            searchable_order_id: row.try_get("searchable_order_id")?,
            customer_order_id: row.try_get("customer_order_id")?,
            status: status.parse().map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?,
            contact: ContactDetails {
                name: row.try_get("customer_name")?,
                phone: row.try_get("customer_phone")?,
                address: row.try_get("delivery_address")?,
            },
            schedule: DeliverySchedule {
                date: row.try_get::<SqlxDate, _>("delivery_date")?.to_jiff(),
                time: row.try_get::<SqlxTime, _>("delivery_time")?.to_jiff(),
                delivery_mode: delivery_mode.parse().map_err(|e| {
                    sqlx::Error::ColumnDecode {
                        index: "delivery_mode".to_string(),
                        source: Box::new(e),
                    }
                })?,
            },
            totals: RoundedTotals {
                subtotal: to_u64("subtotal", row.try_get("subtotal")?)?,
                tax: to_u64("tax", row.try_get("tax")?)?,
                total_delivery_fee: to_u64(
                    "total_delivery_fee",
                    row.try_get("total_delivery_fee")?,
                )?,
                grand_total: to_u64("grand_total", row.try_get("grand_total")?)?,
            },
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
