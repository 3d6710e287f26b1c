//! Dishes Repository

use dishpatch::SpiceLevel;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::domain::vendors::records::{DishRecord, DishUuid, VendorUuid};

const GET_DISHES_SQL: &str = include_str!("../sql/get_dishes.sql");
const LIST_VENDOR_DISHES_SQL: &str = include_str!("../sql/list_vendor_dishes.sql");
const UPSERT_DISH_SQL: &str = include_str!("../sql/upsert_dish.sql");

/// Column values for a dish upsert.
#[derive(Debug)]
pub(crate) struct DishWrite<'a> {
    pub uuid: DishUuid,
    pub vendor: VendorUuid,
    pub name: &'a str,
    pub unit_price: i64,
    pub spice_levels: &'a [SpiceLevel],
    pub available: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgDishesRepository;

impl PgDishesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Dishes matching `dishes`, in no particular order. Unknown uuids are skipped.
    pub(crate) async fn get_dishes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        dishes: &[DishUuid],
    ) -> Result<Vec<DishRecord>, sqlx::Error> {
        let uuids: Vec<Uuid> = dishes.iter().map(|dish| dish.into_uuid()).collect();

        query_as::<Postgres, DishRecord>(GET_DISHES_SQL)
            .bind(uuids.as_slice())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_dishes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        vendor: VendorUuid,
    ) -> Result<Vec<DishRecord>, sqlx::Error> {
        query_as::<Postgres, DishRecord>(LIST_VENDOR_DISHES_SQL)
            .bind(vendor.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Insert or replace a dish. Returns [`sqlx::Error::RowNotFound`] when the uuid is already
    /// taken by another vendor's dish.
    pub(crate) async fn upsert_dish(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        dish: DishWrite<'_>,
    ) -> Result<DishRecord, sqlx::Error> {
        let spice_levels: Vec<&str> = dish
            .spice_levels
            .iter()
            .map(|level| level.as_str())
            .collect();

        query_as::<Postgres, DishRecord>(UPSERT_DISH_SQL)
            .bind(dish.uuid.into_uuid())
            .bind(dish.vendor.into_uuid())
            .bind(dish.name)
            .bind(dish.unit_price)
            .bind(spice_levels)
            .bind(dish.available)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for DishRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let unit_price_i64: i64 = row.try_get("unit_price")?;
        let spice_levels: Vec<String> = row.try_get("spice_levels")?;

        let unit_price = u64::try_from(unit_price_i64).map_err(|e| sqlx::Error::ColumnDecode {
            index: "unit_price".to_string(),
            source: Box::new(e),
        })?;

        let spice_levels = spice_levels
            .iter()
            .map(|level| level.parse::<SpiceLevel>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "spice_levels".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: DishUuid::from_uuid(row.try_get("uuid")?),
            vendor: VendorUuid::from_uuid(row.try_get("vendor_uuid")?),
            name: row.try_get("name")?,
            unit_price,
            spice_levels,
            available: row.try_get("available")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
