//! Checkout
//!
//! Turns the cart, the chosen schedule and the customer's contact details into an order
//! payload, and keeps a customer from placing the same order twice while a submission is
//! outstanding.

use jiff::civil::DateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{
    cart::{CartStorage, CartStore, StoreError, VendorCartGroup},
    schedule::{DeliverySchedule, ScheduleError, validate_schedule},
    totals::{RoundedTotals, TaxRate, TotalsError, compute_totals},
};

/// Errors that stop an order from being submitted.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// There is nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// A previous submission has not finished.
    #[error("an order is already being submitted")]
    AlreadySubmitting,

    /// A contact field was left blank.
    #[error("{0} is required")]
    MissingContact(&'static str),

    /// The schedule is no longer permissible.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Totals could not be derived.
    #[error(transparent)]
    Totals(#[from] TotalsError),

    /// The submitted lines could not be taken out of the cart.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How to reach the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    /// Customer name
    pub name: String,

    /// Phone number
    pub phone: String,

    /// Delivery address
    pub address: String,
}

impl ContactDetails {
    /// Reject blank fields.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingContact`] naming the first blank field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        for (field, value) in [
            ("name", &self.name),
            ("phone", &self.phone),
            ("address", &self.address),
        ] {
            if value.trim().is_empty() {
                return Err(CheckoutError::MissingContact(field));
            }
        }

        Ok(())
    }
}

/// Body of an order submission.
///
/// The totals are what the customer was shown; the server derives its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayload {
    /// Customer contact details
    pub contact: ContactDetails,

    /// Requested schedule
    pub schedule: DeliverySchedule,

    /// Vendor groups from the cart snapshot
    pub groups: Vec<VendorCartGroup>,

    /// Totals shown at checkout
    pub totals: RoundedTotals,
}

/// A submission that has been started and must be completed or abandoned.
#[derive(Debug)]
#[must_use = "a pending submission blocks further submissions until it is completed or abandoned"]
pub struct PendingSubmission {
    payload: OrderPayload,
}

impl PendingSubmission {
    /// The payload to send.
    pub fn payload(&self) -> &OrderPayload {
        &self.payload
    }
}

/// Client-side checkout state.
#[derive(Debug)]
pub struct Checkout {
    tax_rate: TaxRate,
    in_flight: bool,
}

impl Checkout {
    /// Create a checkout applying `tax_rate` to displayed totals.
    pub fn new(tax_rate: TaxRate) -> Self {
        Self {
            tax_rate,
            in_flight: false,
        }
    }

    /// Whether a submission is outstanding.
    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    /// Validate the order and start a submission.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::AlreadySubmitting`]: a previous submission is outstanding.
    /// - [`CheckoutError::EmptyCart`]: the cart has no items.
    /// - [`CheckoutError::MissingContact`]: a contact field is blank.
    /// - [`CheckoutError::Schedule`]: the schedule is too soon at `now`.
    /// - [`CheckoutError::Totals`]: totals overflowed.
    pub fn begin<S: CartStorage>(
        &mut self,
        store: &CartStore<S>,
        contact: ContactDetails,
        schedule: DeliverySchedule,
        now: DateTime,
    ) -> Result<PendingSubmission, CheckoutError> {
        if self.in_flight {
            return Err(CheckoutError::AlreadySubmitting);
        }

        let cart = store.snapshot();

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        contact.validate()?;
        validate_schedule(&schedule, now)?;

        let totals = compute_totals(&cart, schedule.delivery_mode, self.tax_rate)?.rounded()?;

        self.in_flight = true;

        Ok(PendingSubmission {
            payload: OrderPayload {
                contact,
                schedule,
                groups: cart.groups().to_vec(),
                totals,
            },
        })
    }

    /// The order was accepted: take the submitted lines out of the cart.
    ///
    /// Anything the customer added while the submission was in flight stays in the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Store`] when the updated cart cannot be saved. The submission
    /// still counts as finished.
    pub fn complete<S: CartStorage>(
        &mut self,
        pending: PendingSubmission,
        store: &mut CartStore<S>,
    ) -> Result<(), CheckoutError> {
        self.in_flight = false;

        info!(
            groups = pending.payload.groups.len(),
            grand_total = pending.payload.totals.grand_total,
            "checkout.completed"
        );

        store.remove_submitted(&pending.payload.groups)?;

        Ok(())
    }

    /// The order was not accepted; the cart is kept so the customer can retry.
    pub fn abandon(&mut self, pending: PendingSubmission) {
        self.in_flight = false;

        drop(pending);
    }
}
