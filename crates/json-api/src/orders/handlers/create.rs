//! Create Order Handler

use jiff::Timestamp;
use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};

use dishpatch_app::domain::orders::data::NewOrder;

use crate::{
    extensions::*,
    observability,
    orders::{
        errors::into_status_error,
        models::{CreateOrderRequest, OrderResponse},
    },
};

/// Create Order Handler
///
/// Re-validates the schedule, re-prices the order from vendor records and persists it.
#[endpoint(
    tags("orders"),
    summary = "Create Order",
    responses(
        (status_code = StatusCode::CREATED, description = "Order created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::CONFLICT, description = "Order already exists"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Schedule or vendors no longer valid"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Order could not be numbered, retry"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.state_or_500()?;
    let order = NewOrder::try_from(json.into_inner())?;

    let created = state
        .app
        .orders
        .create_order(order, Timestamp::now())
        .await
        .map_err(into_status_error)?;

    observability::record_order_created(created.schedule.delivery_mode.as_str());

    res.add_header(LOCATION, format!("/orders/{}", created.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(created.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use dishpatch::{
        DeliveryMode,
        cart::{CartError, DishUuid},
        schedule::ScheduleError,
    };
    use dishpatch_app::domain::orders::{
        MockOrdersService, OrdersServiceError, records::OrderUuid,
    };

    use crate::test_helpers::{make_order, orders_service};

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        orders_service(orders, Router::with_path("orders").post(handler))
    }

    fn payload(uuid: OrderUuid) -> Value {
        json!({
            "uuid": uuid.into_uuid(),
            "searchable_order_id": 42,
            "contact": {
                "name": "Ada Lovelace",
                "phone": "555-0100",
                "address": "12 Analytical Way"
            },
            "schedule": { "date": "2026-10-19", "time": "18:30", "delivery_mode": "delivery" },
            "groups": [{
                "vendor": "01900000-0000-7000-8000-000000000001",
                "store_name": "Noodle Bar",
                "delivery_fee": 350,
                "items": [{
                    "dish": "01900000-0000-7000-8000-0000000000a1",
                    "name": "Dan Dan Noodles",
                    "unit_price": 1200,
                    "quantity": 2,
                    "option": "hot"
                }]
            }],
            "totals": { "subtotal": 2400, "tax": 192, "total_delivery_fee": 350, "grand_total": 2942 }
        })
    }

    #[tokio::test]
    async fn test_create_order_returns_201_with_location() -> TestResult {
        let uuid = OrderUuid::new();
        let order = make_order(uuid);

        let mut orders = MockOrdersService::new();

        orders
            .expect_create_order()
            .once()
            .withf(move |new, _| {
                new.uuid == uuid
                    && new.schedule.delivery_mode == DeliveryMode::Delivery
                    && new.groups.len() == 1
                    && new.client_totals.map(|totals| totals.grand_total) == Some(2_942)
            })
            .return_once(move |_, _| Ok(order));

        orders.expect_get_order().never();
        orders.expect_list_orders().never();
        orders.expect_backfill_searchable_ids().never();

        let mut res = TestClient::post("http://example.com/orders")
            .json(&payload(uuid))
            .send(&make_service(orders))
            .await;

        let body: OrderResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/orders/{uuid}").as_str()));
        assert_eq!(body.uuid, uuid.into_uuid());
        assert_eq!(body.status, "pending");

        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_stale_schedule_returns_422() -> TestResult {
        let uuid = OrderUuid::new();

        let mut orders = MockOrdersService::new();

        orders.expect_create_order().once().return_once(|_, _| {
            Err(OrdersServiceError::Schedule(ScheduleError::TooSoon {
                earliest: jiff::civil::date(2026, 10, 19).at(19, 0, 0, 0),
            }))
        });

        let res = TestClient::post("http://example.com/orders")
            .json(&payload(uuid))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_unavailable_dish_returns_422() -> TestResult {
        let uuid = OrderUuid::new();

        let mut orders = MockOrdersService::new();

        orders
            .expect_create_order()
            .once()
            .withf(|new, _| {
                new.groups
                    .first()
                    .and_then(|group| group.items.first())
                    .is_some_and(|item| item.unit_price == 1)
            })
            .return_once(|_, _| {
                Err(OrdersServiceError::DishNotOrderable(CartError::DishUnavailable(
                    DishUuid::new(),
                )))
            });

        let mut body = payload(uuid);
        body["groups"][0]["items"][0]["unit_price"] = json!(1);

        let res = TestClient::post("http://example.com/orders")
            .json(&body)
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_conflict_returns_409() -> TestResult {
        let uuid = OrderUuid::new();

        let mut orders = MockOrdersService::new();

        orders
            .expect_create_order()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::AlreadyExists));

        let res = TestClient::post("http://example.com/orders")
            .json(&payload(uuid))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_exhausted_ids_returns_503() -> TestResult {
        let uuid = OrderUuid::new();

        let mut orders = MockOrdersService::new();

        orders
            .expect_create_order()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::SearchableIdExhausted { attempts: 5 }));

        let res = TestClient::post("http://example.com/orders")
            .json(&payload(uuid))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::SERVICE_UNAVAILABLE));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_malformed_time_returns_400() -> TestResult {
        let uuid = OrderUuid::new();
        let mut body = payload(uuid);

        body["schedule"]["time"] = json!("half six");

        let mut orders = MockOrdersService::new();

        orders.expect_create_order().never();

        let res = TestClient::post("http://example.com/orders")
            .json(&body)
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
