//! Get Vendor Handler

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dishpatch_app::domain::vendors::records::VendorRecord;

use crate::{extensions::*, vendors::errors::into_status_error};

/// Vendor Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VendorResponse {
    pub uuid: Uuid,
    pub store_name: String,

    /// Delivery fee charged per order in minor currency units
    pub delivery_fee: u64,

    pub created_at: String,
    pub updated_at: String,
}

impl From<VendorRecord> for VendorResponse {
    fn from(vendor: VendorRecord) -> Self {
        Self {
            uuid: vendor.uuid.into(),
            store_name: vendor.store_name,
            delivery_fee: vendor.delivery_fee,
            created_at: vendor.created_at.to_string(),
            updated_at: vendor.updated_at.to_string(),
        }
    }
}

/// Get Vendor Handler
///
/// Returns the store name and delivery fee orders are priced with.
#[endpoint(tags("vendors"), summary = "Get Vendor")]
pub(crate) async fn handler(
    vendor: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<VendorResponse>, StatusError> {
    let state = depot.state_or_500()?;

    let vendor = state
        .app
        .vendors
        .get_vendor(vendor.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(vendor.into()))
}
