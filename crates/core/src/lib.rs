//! Dishpatch
//!
//! Dishpatch is the checkout core of a multi-vendor food delivery marketplace: a vendor-grouped
//! cart, fee and totals derivation, delivery schedule validation and order submission.

pub mod cart;
pub mod checkout;
pub mod ids;
pub mod schedule;
pub mod totals;

pub use cart::{Cart, CartLineItem, CartStore, Dish, SpiceLevel, VendorCartGroup, VendorRef};
pub use checkout::{Checkout, CheckoutError, ContactDetails, OrderPayload};
pub use schedule::{
    DeliveryMode, DeliverySchedule, ScheduleStatus, check_schedule, is_schedule_valid,
    minimum_date_time,
};
pub use totals::{OrderTotals, RoundedTotals, TaxRate, compute_totals};
