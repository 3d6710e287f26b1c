//! Vendor Errors

use salvo::http::StatusError;
use tracing::error;

use dishpatch_app::domain::vendors::VendorsServiceError;

pub(crate) fn into_status_error(error: VendorsServiceError) -> StatusError {
    match error {
        VendorsServiceError::NotFound => StatusError::not_found().brief("Vendor not found"),
        VendorsServiceError::MissingRequiredData | VendorsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid vendor payload")
        }
        VendorsServiceError::InvalidReference => {
            StatusError::unprocessable_entity().brief("Unknown vendor")
        }
        VendorsServiceError::DishVendorMismatch => {
            StatusError::conflict().brief("Dish belongs to another vendor")
        }
        VendorsServiceError::InvalidAmount(source) => {
            error!("vendor amount out of range: {source}");

            StatusError::internal_server_error()
        }
        VendorsServiceError::Sql(source) => {
            error!("vendor storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
