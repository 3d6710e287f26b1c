//! Get Order Handler

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
};

/// Get Order Handler
///
/// Returns a single order with its vendor groups.
#[endpoint(tags("orders"), summary = "Get Order")]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.state_or_500()?;

    let order = state
        .app
        .orders
        .get_order(order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use dishpatch_app::domain::orders::{
        MockOrdersService, OrdersServiceError, records::OrderUuid,
    };

    use crate::test_helpers::{make_order, orders_service};

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        orders_service(orders, Router::with_path("orders/{order}").get(handler))
    }

    #[tokio::test]
    async fn test_get_returns_order() -> TestResult {
        let uuid = OrderUuid::new();
        let order = make_order(uuid);

        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order()
            .once()
            .withf(move |u| *u == uuid)
            .return_once(move |_| Ok(order));

        orders.expect_create_order().never();
        orders.expect_list_orders().never();

        let mut res = TestClient::get(format!("http://example.com/orders/{uuid}"))
            .send(&make_service(orders))
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.uuid, uuid.into_uuid());
        assert_eq!(body.schedule.time, "18:30");
        assert_eq!(body.totals.grand_total, 2_942);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_order_returns_404() -> TestResult {
        let uuid = OrderUuid::new();

        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order()
            .once()
            .withf(move |u| *u == uuid)
            .return_once(|_| Err(OrdersServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/orders/{uuid}"))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
