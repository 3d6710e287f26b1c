//! Order Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use dishpatch_app::domain::orders::OrdersServiceError;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::AlreadyExists => StatusError::conflict().brief("Order already exists"),
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::MissingRequiredData
        | OrdersServiceError::InvalidData
        | OrdersServiceError::InvalidAmount(_) => {
            StatusError::bad_request().brief("Invalid order payload")
        }
        OrdersServiceError::InvalidCart(source) => StatusError::bad_request()
            .brief("Invalid order items")
            .detail(source.to_string()),
        OrdersServiceError::Schedule(source) => StatusError::unprocessable_entity()
            .brief("Delivery time is no longer available")
            .detail(source.to_string()),
        OrdersServiceError::UnknownVendor(vendor) => StatusError::unprocessable_entity()
            .brief("Unknown vendor")
            .detail(format!("vendor {vendor} does not exist")),
        OrdersServiceError::UnknownDish(dish) => StatusError::unprocessable_entity()
            .brief("Unknown dish")
            .detail(format!("dish {dish} is not on the vendor's menu")),
        OrdersServiceError::DishNotOrderable(source) => StatusError::unprocessable_entity()
            .brief("Dish cannot be ordered")
            .detail(source.to_string()),
        OrdersServiceError::InvalidReference => {
            StatusError::unprocessable_entity().brief("Order references an unknown vendor")
        }
        OrdersServiceError::EmptyOrder => {
            StatusError::unprocessable_entity().brief("Order has no items")
        }
        OrdersServiceError::Totals(source) => StatusError::unprocessable_entity()
            .brief("Order totals out of range")
            .detail(source.to_string()),
        OrdersServiceError::SearchableIdExhausted { attempts } => {
            warn!(attempts, "order.searchable_id_exhausted");

            StatusError::service_unavailable().brief("Order could not be numbered, retry shortly")
        }
        OrdersServiceError::CorruptRecord(detail) => {
            error!("corrupt order record: {detail}");

            StatusError::internal_server_error()
        }
        OrdersServiceError::Sql(source) => {
            error!("order storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
