//! Vendors service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::vendors::{
        data::{DishUpsert, VendorUpsert},
        errors::VendorsServiceError,
        records::{DishRecord, VendorRecord, VendorUuid},
        repositories::{DishWrite, PgDishesRepository, PgVendorsRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgVendorsService {
    db: Db,
    repository: PgVendorsRepository,
    dishes: PgDishesRepository,
}

impl PgVendorsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgVendorsRepository::new(),
            dishes: PgDishesRepository::new(),
        }
    }
}

#[async_trait]
impl VendorsService for PgVendorsService {
    async fn get_vendor(&self, vendor: VendorUuid) -> Result<VendorRecord, VendorsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.get_vendor(&mut tx, vendor).await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn upsert_vendor(
        &self,
        vendor: VendorUpsert,
    ) -> Result<VendorRecord, VendorsServiceError> {
        if vendor.store_name.trim().is_empty() {
            return Err(VendorsServiceError::MissingRequiredData);
        }

        let delivery_fee = i64::try_from(vendor.delivery_fee)?;

        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .upsert_vendor(&mut tx, vendor.uuid, vendor.store_name.trim(), delivery_fee)
            .await?;

        tx.commit().await?;

        info!(
            vendor = %record.uuid,
            delivery_fee = record.delivery_fee,
            "vendor.upserted"
        );

        Ok(record)
    }

    async fn list_dishes(&self, vendor: VendorUuid) -> Result<Vec<DishRecord>, VendorsServiceError> {
        let mut tx = self.db.begin().await?;

        self.repository.get_vendor(&mut tx, vendor).await?;

        let dishes = self.dishes.list_dishes(&mut tx, vendor).await?;

        tx.commit().await?;

        Ok(dishes)
    }

    async fn upsert_dish(&self, dish: DishUpsert) -> Result<DishRecord, VendorsServiceError> {
        if dish.name.trim().is_empty() {
            return Err(VendorsServiceError::MissingRequiredData);
        }

        let unit_price = i64::try_from(dish.unit_price)?;

        let mut spice_levels = Vec::with_capacity(dish.spice_levels.len());

        for level in &dish.spice_levels {
            if !spice_levels.contains(level) {
                spice_levels.push(*level);
            }
        }

        let mut tx = self.db.begin().await?;

        let written = self
            .dishes
            .upsert_dish(
                &mut tx,
                DishWrite {
                    uuid: dish.uuid,
                    vendor: dish.vendor,
                    name: dish.name.trim(),
                    unit_price,
                    spice_levels: &spice_levels,
                    available: dish.available,
                },
            )
            .await;

        let record = match written {
            Ok(record) => record,
            Err(sqlx::Error::RowNotFound) => return Err(VendorsServiceError::DishVendorMismatch),
            Err(error) => return Err(error.into()),
        };

        tx.commit().await?;

        info!(
            vendor = %record.vendor,
            dish = %record.uuid,
            unit_price = record.unit_price,
            available = record.available,
            "vendor.dish_upserted"
        );

        Ok(record)
    }
}

#[automock]
#[async_trait]
pub trait VendorsService: Send + Sync {
    /// Retrieve a single vendor.
    async fn get_vendor(&self, vendor: VendorUuid) -> Result<VendorRecord, VendorsServiceError>;

    /// Create a vendor, or replace the store name and delivery fee of an existing one.
    async fn upsert_vendor(&self, vendor: VendorUpsert)
    -> Result<VendorRecord, VendorsServiceError>;

    /// The vendor's menu, ordered by name.
    async fn list_dishes(&self, vendor: VendorUuid) -> Result<Vec<DishRecord>, VendorsServiceError>;

    /// Add a dish to a vendor's menu, or replace its price, options and availability.
    async fn upsert_dish(&self, dish: DishUpsert) -> Result<DishRecord, VendorsServiceError>;
}
