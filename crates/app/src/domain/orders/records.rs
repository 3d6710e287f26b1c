//! Order Records

use std::{fmt, str::FromStr};

use dishpatch::{
    RoundedTotals, VendorCartGroup, checkout::ContactDetails, ids::TypedUuid,
    schedule::DeliverySchedule,
};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Where an order is in its lifecycle. Transitions happen outside checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown order status \"{0}\"")]
pub struct UnknownOrderStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(UnknownOrderStatus(other.to_string())),
        }
    }
}

/// Order Record
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,

    /// Search-friendly id; `None` only for rows created before ids existed and not yet
    /// backfilled.
    pub searchable_order_id: Option<i64>,

    pub customer_order_id: i64,
    pub status: OrderStatus,
    pub contact: ContactDetails,
    pub schedule: DeliverySchedule,
    pub groups: Vec<VendorCartGroup>,
    pub totals: RoundedTotals,
    pub created_at: Timestamp,
}
