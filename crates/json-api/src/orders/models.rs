//! Order request and response bodies.

use jiff::civil::{Date, Time};
use salvo::{oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dishpatch::{
    CartLineItem, DeliveryMode, DeliverySchedule, RoundedTotals, SpiceLevel, VendorCartGroup,
    checkout::ContactDetails,
};
use dishpatch_app::domain::orders::{
    data::{NewOrder, OrderPage},
    records::OrderRecord,
};

use crate::extensions::*;

const TIME_FORMAT: &str = "%H:%M";

/// Customer contact details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub(crate) struct ContactBody {
    pub name: String,
    pub phone: String,
    pub address: String,
}

impl From<ContactBody> for ContactDetails {
    fn from(body: ContactBody) -> Self {
        ContactDetails {
            name: body.name,
            phone: body.phone,
            address: body.address,
        }
    }
}

impl From<ContactDetails> for ContactBody {
    fn from(contact: ContactDetails) -> Self {
        Self {
            name: contact.name,
            phone: contact.phone,
            address: contact.address,
        }
    }
}

/// Requested delivery or pickup slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub(crate) struct ScheduleBody {
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,

    /// Wall clock time, `HH:MM`
    pub time: String,

    /// `delivery` or `pickup`
    pub delivery_mode: String,
}

impl TryFrom<ScheduleBody> for DeliverySchedule {
    type Error = StatusError;

    fn try_from(body: ScheduleBody) -> Result<Self, Self::Error> {
        Ok(DeliverySchedule {
            date: body
                .date
                .parse::<Date>()
                .or_400("could not parse schedule date")?,
            time: Time::strptime(TIME_FORMAT, &body.time).or_400("could not parse schedule time")?,
            delivery_mode: body
                .delivery_mode
                .parse::<DeliveryMode>()
                .or_400("could not parse delivery mode")?,
        })
    }
}

impl From<DeliverySchedule> for ScheduleBody {
    fn from(schedule: DeliverySchedule) -> Self {
        Self {
            date: schedule.date.to_string(),
            time: schedule.time.strftime(TIME_FORMAT).to_string(),
            delivery_mode: schedule.delivery_mode.as_str().to_string(),
        }
    }
}

/// A dish in an order
///
/// On submission the name and price are what the customer saw; the stored order carries the
/// vendor menu's values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub(crate) struct LineItemBody {
    pub dish: Uuid,
    pub name: String,

    /// Price of one unit in minor currency units
    pub unit_price: u64,

    pub quantity: u32,

    /// Spice level, when the dish offers one
    #[serde(default)]
    pub option: Option<String>,
}

impl TryFrom<LineItemBody> for CartLineItem {
    type Error = StatusError;

    fn try_from(body: LineItemBody) -> Result<Self, Self::Error> {
        Ok(CartLineItem {
            dish: body.dish.into(),
            name: body.name,
            unit_price: body.unit_price,
            quantity: body.quantity,
            option: body
                .option
                .map(|option| option.parse::<SpiceLevel>())
                .transpose()
                .or_400("could not parse dish option")?,
        })
    }
}

impl From<CartLineItem> for LineItemBody {
    fn from(item: CartLineItem) -> Self {
        Self {
            dish: item.dish.into(),
            name: item.name,
            unit_price: item.unit_price,
            quantity: item.quantity,
            option: item.option.map(|option| option.as_str().to_string()),
        }
    }
}

/// The dishes ordered from one vendor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub(crate) struct VendorGroupBody {
    pub vendor: Uuid,
    pub store_name: String,

    /// Delivery fee in minor currency units
    pub delivery_fee: u64,

    pub items: Vec<LineItemBody>,
}

impl TryFrom<VendorGroupBody> for VendorCartGroup {
    type Error = StatusError;

    fn try_from(body: VendorGroupBody) -> Result<Self, Self::Error> {
        Ok(VendorCartGroup {
            vendor: body.vendor.into(),
            store_name: body.store_name,
            delivery_fee: body.delivery_fee,
            items: body
                .items
                .into_iter()
                .map(CartLineItem::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl From<VendorCartGroup> for VendorGroupBody {
    fn from(group: VendorCartGroup) -> Self {
        Self {
            vendor: group.vendor.into(),
            store_name: group.store_name,
            delivery_fee: group.delivery_fee,
            items: group.items.into_iter().map(LineItemBody::from).collect(),
        }
    }
}

/// Order totals in minor currency units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct TotalsBody {
    pub subtotal: u64,
    pub tax: u64,
    pub total_delivery_fee: u64,
    pub grand_total: u64,
}

impl From<TotalsBody> for RoundedTotals {
    fn from(body: TotalsBody) -> Self {
        RoundedTotals {
            subtotal: body.subtotal,
            tax: body.tax,
            total_delivery_fee: body.total_delivery_fee,
            grand_total: body.grand_total,
        }
    }
}

impl From<RoundedTotals> for TotalsBody {
    fn from(totals: RoundedTotals) -> Self {
        Self {
            subtotal: totals.subtotal,
            tax: totals.tax,
            total_delivery_fee: totals.total_delivery_fee,
            grand_total: totals.grand_total,
        }
    }
}

/// Create Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateOrderRequest {
    pub uuid: Uuid,
    pub contact: ContactBody,
    pub schedule: ScheduleBody,
    pub groups: Vec<VendorGroupBody>,

    /// Totals shown to the customer; the server computes its own
    #[serde(default)]
    pub totals: Option<TotalsBody>,
}

impl TryFrom<CreateOrderRequest> for NewOrder {
    type Error = StatusError;

    fn try_from(request: CreateOrderRequest) -> Result<Self, Self::Error> {
        Ok(NewOrder {
            uuid: request.uuid.into(),
            contact: request.contact.into(),
            schedule: request.schedule.try_into()?,
            groups: request
                .groups
                .into_iter()
                .map(VendorCartGroup::try_from)
                .collect::<Result<_, _>>()?,
            client_totals: request.totals.map(Into::into),
        })
    }
}

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    pub uuid: Uuid,

    /// Number customers and staff search by; absent on orders awaiting backfill
    pub searchable_order_id: Option<i64>,

    /// Sequential order number
    pub customer_order_id: i64,

    pub status: String,
    pub contact: ContactBody,
    pub schedule: ScheduleBody,
    pub groups: Vec<VendorGroupBody>,
    pub totals: TotalsBody,

    /// The date and time the order was placed
    pub created_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        Self {
            uuid: order.uuid.into(),
            searchable_order_id: order.searchable_order_id,
            customer_order_id: order.customer_order_id,
            status: order.status.as_str().to_string(),
            contact: order.contact.into(),
            schedule: order.schedule.into(),
            groups: order.groups.into_iter().map(VendorGroupBody::from).collect(),
            totals: order.totals.into(),
            created_at: order.created_at.to_string(),
        }
    }
}

/// Orders Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrdersResponse {
    /// Orders on this page, newest first
    pub orders: Vec<OrderResponse>,

    /// Orders matching the filters across all pages
    pub total: u64,

    pub page: u32,
    pub per_page: u32,
}

impl From<OrderPage> for OrdersResponse {
    fn from(page: OrderPage) -> Self {
        Self {
            orders: page.orders.into_iter().map(OrderResponse::from).collect(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn schedule(date: &str, time: &str, mode: &str) -> ScheduleBody {
        ScheduleBody {
            date: date.to_string(),
            time: time.to_string(),
            delivery_mode: mode.to_string(),
        }
    }

    #[test]
    fn schedule_body_parses_date_time_and_mode() -> TestResult {
        let parsed = DeliverySchedule::try_from(schedule("2026-10-19", "18:30", "pickup"))?;

        assert_eq!(parsed.date, jiff::civil::date(2026, 10, 19));
        assert_eq!(parsed.time, jiff::civil::time(18, 30, 0, 0));
        assert_eq!(parsed.delivery_mode, DeliveryMode::Pickup);
        assert_eq!(ScheduleBody::from(parsed), schedule("2026-10-19", "18:30", "pickup"));

        Ok(())
    }

    #[test]
    fn malformed_schedule_is_a_bad_request() {
        for body in [
            schedule("19/10/2026", "18:30", "delivery"),
            schedule("2026-10-19", "6pm", "delivery"),
            schedule("2026-10-19", "18:30", "drone"),
        ] {
            let error = DeliverySchedule::try_from(body).err();

            assert_eq!(
                error.map(|e| e.code),
                Some(salvo::http::StatusCode::BAD_REQUEST)
            );
        }
    }

    #[test]
    fn unknown_dish_option_is_a_bad_request() {
        let item = LineItemBody {
            dish: Uuid::nil(),
            name: "Dan Dan Noodles".to_string(),
            unit_price: 1_200,
            quantity: 1,
            option: Some("volcanic".to_string()),
        };

        assert!(CartLineItem::try_from(item).is_err());
    }
}
