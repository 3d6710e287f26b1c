//! Test helpers.

use std::sync::Arc;

use jiff::{
    Timestamp,
    civil::{date, time},
};
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use dishpatch::{
    CartLineItem, DeliveryMode, DeliverySchedule, RoundedTotals, SpiceLevel, VendorCartGroup,
    checkout::ContactDetails,
};
use dishpatch_app::{
    context::AppContext,
    domain::{
        orders::{
            MockOrdersService,
            records::{OrderRecord, OrderStatus, OrderUuid},
        },
        vendors::MockVendorsService,
    },
};

use crate::state::State;

fn strict_orders_mock() -> MockOrdersService {
    let mut orders = MockOrdersService::new();

    orders.expect_create_order().never();
    orders.expect_get_order().never();
    orders.expect_list_orders().never();
    orders.expect_backfill_searchable_ids().never();

    orders
}

fn strict_vendors_mock() -> MockVendorsService {
    let mut vendors = MockVendorsService::new();

    vendors.expect_get_vendor().never();
    vendors.expect_upsert_vendor().never();

    vendors
}

fn state(orders: MockOrdersService, vendors: MockVendorsService) -> Arc<State> {
    State::from_app_context(AppContext {
        orders: Arc::new(orders),
        vendors: Arc::new(vendors),
    })
}

pub(crate) fn orders_service(orders: MockOrdersService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state(orders, strict_vendors_mock())))
            .push(route),
    )
}

pub(crate) fn vendors_service(vendors: MockVendorsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state(strict_orders_mock(), vendors)))
            .push(route),
    )
}

/// A pending delivery order of two hot noodle bowls from one vendor.
pub(crate) fn make_order(uuid: OrderUuid) -> OrderRecord {
    OrderRecord {
        uuid,
        searchable_order_id: Some(1_760_896_800_123),
        customer_order_id: 1,
        status: OrderStatus::Pending,
        contact: ContactDetails {
            name: "Ada Lovelace".to_string(),
            phone: "555-0100".to_string(),
            address: "12 Analytical Way".to_string(),
        },
        schedule: DeliverySchedule {
            date: date(2026, 10, 19),
            time: time(18, 30, 0, 0),
            delivery_mode: DeliveryMode::Delivery,
        },
        groups: vec![VendorCartGroup {
            vendor: Uuid::nil().into(),
            store_name: "Noodle Bar".to_string(),
            delivery_fee: 350,
            items: vec![CartLineItem {
                dish: Uuid::max().into(),
                name: "Dan Dan Noodles".to_string(),
                unit_price: 1_200,
                quantity: 2,
                option: Some(SpiceLevel::Hot),
            }],
        }],
        totals: RoundedTotals {
            subtotal: 2_400,
            tax: 192,
            total_delivery_fee: 350,
            grand_total: 2_942,
        },
        created_at: Timestamp::UNIX_EPOCH,
    }
}
