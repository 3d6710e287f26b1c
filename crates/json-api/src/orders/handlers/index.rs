//! Order Index Handler

use salvo::{oapi::extract::QueryParam, prelude::*};

use dishpatch_app::domain::orders::{
    data::{DEFAULT_PER_PAGE, OrderQuery},
    records::OrderStatus,
};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrdersResponse},
};

/// Order Index Handler
///
/// Searches orders by searchable id, customer name, phone, address or store name. Without a
/// search, lists every order newest first.
#[endpoint(tags("orders"), summary = "List Orders")]
pub(crate) async fn handler(
    search: QueryParam<String, false>,
    status: QueryParam<String, false>,
    page: QueryParam<u32, false>,
    per_page: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<OrdersResponse>, StatusError> {
    let state = depot.state_or_500()?;

    let status = status
        .into_inner()
        .map(|status| status.parse::<OrderStatus>())
        .transpose()
        .or_400("could not parse \"status\" query parameter")?;

    let query = OrderQuery {
        search: search.into_inner(),
        status,
        page: page.into_inner().unwrap_or(1),
        per_page: per_page.into_inner().unwrap_or(DEFAULT_PER_PAGE),
    };

    let page = state
        .app
        .orders
        .list_orders(query)
        .await
        .map_err(into_status_error)?;

    Ok(Json(page.into()))
}
