//! Vendor Menu Handler

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dishpatch_app::domain::vendors::records::DishRecord;

use crate::{extensions::*, vendors::errors::into_status_error};

/// Menu entry
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DishResponse {
    pub uuid: Uuid,
    pub name: String,

    /// Price of one portion in minor currency units
    pub unit_price: u64,

    /// Spice levels the customer may choose from
    pub spice_levels: Vec<String>,

    pub available: bool,
}

impl From<DishRecord> for DishResponse {
    fn from(dish: DishRecord) -> Self {
        Self {
            uuid: dish.uuid.into(),
            name: dish.name,
            unit_price: dish.unit_price,
            spice_levels: dish
                .spice_levels
                .into_iter()
                .map(|level| level.as_str().to_string())
                .collect(),
            available: dish.available,
        }
    }
}

/// Vendor Menu Handler
///
/// Returns the dishes and prices orders from this vendor are charged with.
#[endpoint(tags("vendors"), summary = "List Vendor Dishes")]
pub(crate) async fn handler(
    vendor: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Vec<DishResponse>>, StatusError> {
    let state = depot.state_or_500()?;

    let dishes = state
        .app
        .vendors
        .list_dishes(vendor.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(dishes.into_iter().map(DishResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use dishpatch::SpiceLevel;
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use dishpatch_app::domain::vendors::{
        MockVendorsService, VendorsServiceError,
        records::{DishUuid, VendorUuid},
    };

    use crate::test_helpers::vendors_service;

    use super::*;

    fn make_service(vendors: MockVendorsService) -> Service {
        vendors_service(
            vendors,
            Router::with_path("vendors/{vendor}/dishes").get(handler),
        )
    }

    #[tokio::test]
    async fn test_dishes_lists_menu() -> TestResult {
        let vendor = VendorUuid::new();
        let dish = DishUuid::new();

        let mut vendors = MockVendorsService::new();

        vendors
            .expect_list_dishes()
            .once()
            .withf(move |v| *v == vendor)
            .return_once(move |_| {
                Ok(vec![DishRecord {
                    uuid: dish,
                    vendor,
                    name: "Dan Dan Noodles".to_string(),
                    unit_price: 1200,
                    spice_levels: vec![SpiceLevel::Mild, SpiceLevel::ExtraHot],
                    available: false,
                    created_at: Timestamp::UNIX_EPOCH,
                    updated_at: Timestamp::UNIX_EPOCH,
                }])
            });

        vendors.expect_get_vendor().never();
        vendors.expect_upsert_dish().never();

        let response: Vec<DishResponse> =
            TestClient::get(format!("http://example.com/vendors/{vendor}/dishes"))
                .send(&make_service(vendors))
                .await
                .take_json()
                .await?;

        let first = response.first().ok_or("missing dish")?;

        assert_eq!(response.len(), 1);
        assert_eq!(first.uuid, dish.into_uuid());
        assert_eq!(first.unit_price, 1200);
        assert_eq!(first.spice_levels, vec!["mild", "extra_hot"]);
        assert!(!first.available);

        Ok(())
    }

    #[tokio::test]
    async fn test_dishes_of_missing_vendor_returns_404() -> TestResult {
        let vendor = VendorUuid::new();

        let mut vendors = MockVendorsService::new();

        vendors
            .expect_list_dishes()
            .once()
            .return_once(|_| Err(VendorsServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/vendors/{vendor}/dishes"))
            .send(&make_service(vendors))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
