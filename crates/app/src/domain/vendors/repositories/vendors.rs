//! Vendors Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::domain::vendors::records::{VendorRecord, VendorUuid};

const GET_VENDOR_SQL: &str = include_str!("../sql/get_vendor.sql");
const GET_VENDORS_SQL: &str = include_str!("../sql/get_vendors.sql");
const UPSERT_VENDOR_SQL: &str = include_str!("../sql/upsert_vendor.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgVendorsRepository;

impl PgVendorsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_vendor(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        vendor: VendorUuid,
    ) -> Result<VendorRecord, sqlx::Error> {
        query_as::<Postgres, VendorRecord>(GET_VENDOR_SQL)
            .bind(vendor.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Vendors matching `vendors`, in no particular order. Unknown uuids are skipped.
    pub(crate) async fn get_vendors(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        vendors: &[VendorUuid],
    ) -> Result<Vec<VendorRecord>, sqlx::Error> {
        let uuids: Vec<Uuid> = vendors.iter().map(|vendor| vendor.into_uuid()).collect();

        query_as::<Postgres, VendorRecord>(GET_VENDORS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn upsert_vendor(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        vendor: VendorUuid,
        store_name: &str,
        delivery_fee: i64,
    ) -> Result<VendorRecord, sqlx::Error> {
        query_as::<Postgres, VendorRecord>(UPSERT_VENDOR_SQL)
            .bind(vendor.into_uuid())
            .bind(store_name)
            .bind(delivery_fee)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for VendorRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let delivery_fee_i64: i64 = row.try_get("delivery_fee")?;

        let delivery_fee =
            u64::try_from(delivery_fee_i64).map_err(|e| sqlx::Error::ColumnDecode {
                index: "delivery_fee".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: VendorUuid::from_uuid(row.try_get("uuid")?),
            store_name: row.try_get("store_name")?,
            delivery_fee,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
