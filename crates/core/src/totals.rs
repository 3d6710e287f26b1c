//! Fee & Totals
//!
//! Totals are derived from a cart snapshot every time they are needed. Subtotals and fees are
//! whole minor units; tax is carried as a [`Decimal`] and nothing is rounded until
//! [`OrderTotals::rounded`].

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    cart::{Cart, VendorUuid},
    schedule::DeliveryMode,
};

/// Errors raised while deriving totals.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TotalsError {
    /// An amount exceeded the representable range.
    #[error("order totals overflowed")]
    Overflow,

    /// The tax rate is negative or not a number.
    #[error("tax rate must be a non-negative number")]
    InvalidTaxRate,
}

/// Sales tax rate applied to the subtotal.
#[derive(Debug, Clone, Copy)]
pub struct TaxRate(Percentage);

impl TaxRate {
    /// A zero rate.
    pub fn zero() -> Self {
        Self(Percentage::from(0.0))
    }

    /// Build a rate from a fraction, so `0.08` is 8%.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsError::InvalidTaxRate`] for negative or non-finite fractions.
    pub fn from_fraction(fraction: f64) -> Result<Self, TotalsError> {
        if !fraction.is_finite() || fraction < 0.0 {
            return Err(TotalsError::InvalidTaxRate);
        }

        // Going through the shortest decimal form keeps 0.08 exact.
        Percentage::try_from(fraction.to_string().as_str())
            .map(Self)
            .map_err(|_invalid| TotalsError::InvalidTaxRate)
    }

    /// The rate as a decimal fraction.
    pub fn as_decimal(&self) -> Decimal {
        // Percentage only exposes its value through multiplication.
        self.0 * Decimal::ONE
    }

    fn apply(&self, minor: u64) -> Result<Decimal, TotalsError> {
        self.as_decimal()
            .checked_mul(Decimal::from(minor))
            .ok_or(TotalsError::Overflow)
    }
}

impl From<Percentage> for TaxRate {
    fn from(percentage: Percentage) -> Self {
        Self(percentage)
    }
}

/// A vendor's delivery fee as charged on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorFee {
    /// Vendor the fee belongs to
    pub vendor: VendorUuid,

    /// Fee in minor units
    pub delivery_fee: u64,
}

/// Full-precision order totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTotals {
    /// Sum of unit price times quantity across every line
    pub subtotal: u64,

    /// Subtotal times the tax rate, unrounded
    pub tax: Decimal,

    /// Fee per vendor group; empty for pickup
    pub per_vendor_delivery_fee: SmallVec<[VendorFee; 4]>,

    /// Sum of the per-vendor fees
    pub total_delivery_fee: u64,

    /// Subtotal plus tax plus delivery fees, unrounded
    pub grand_total: Decimal,
}

impl OrderTotals {
    /// Round to whole minor units for display or persistence.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsError::Overflow`] when a rounded amount does not fit in `u64`.
    pub fn rounded(&self) -> Result<RoundedTotals, TotalsError> {
        Ok(RoundedTotals {
            subtotal: self.subtotal,
            tax: round_minor(self.tax)?,
            total_delivery_fee: self.total_delivery_fee,
            grand_total: round_minor(self.grand_total)?,
        })
    }
}

/// Totals rounded to whole minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundedTotals {
    /// Subtotal
    pub subtotal: u64,

    /// Tax
    pub tax: u64,

    /// Total delivery fee
    pub total_delivery_fee: u64,

    /// Grand total
    pub grand_total: u64,
}

impl RoundedTotals {
    /// The grand total as money in `currency`.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsError::Overflow`] when the amount is too large to format.
    pub fn grand_total_money(
        &self,
        currency: &'static Currency,
    ) -> Result<Money<'static, Currency>, TotalsError> {
        money(self.grand_total, currency)
    }
}

/// Minor units as money in `currency`.
///
/// # Errors
///
/// Returns [`TotalsError::Overflow`] when the amount does not fit the money type.
pub fn money(
    minor: u64,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, TotalsError> {
    let minor = i64::try_from(minor).map_err(|_overflow| TotalsError::Overflow)?;

    Ok(Money::from_minor(minor, currency))
}

/// Derive order totals from a cart.
///
/// Pickup orders carry no delivery fees whatever the vendors charge.
///
/// # Errors
///
/// Returns [`TotalsError::Overflow`] if any sum overflows.
pub fn compute_totals(
    cart: &Cart,
    mode: DeliveryMode,
    tax_rate: TaxRate,
) -> Result<OrderTotals, TotalsError> {
    let mut subtotal: u64 = 0;

    for item in cart.groups().iter().flat_map(|group| &group.items) {
        let line = item
            .unit_price
            .checked_mul(u64::from(item.quantity))
            .ok_or(TotalsError::Overflow)?;

        subtotal = subtotal.checked_add(line).ok_or(TotalsError::Overflow)?;
    }

    let per_vendor_delivery_fee: SmallVec<[VendorFee; 4]> = match mode {
        DeliveryMode::Delivery => cart
            .groups()
            .iter()
            .map(|group| VendorFee {
                vendor: group.vendor,
                delivery_fee: group.delivery_fee,
            })
            .collect(),
        DeliveryMode::Pickup => SmallVec::new(),
    };

    let total_delivery_fee = per_vendor_delivery_fee
        .iter()
        .try_fold(0_u64, |total, fee| total.checked_add(fee.delivery_fee))
        .ok_or(TotalsError::Overflow)?;

    let tax = tax_rate.apply(subtotal)?;

    let grand_total = Decimal::from(subtotal)
        .checked_add(tax)
        .and_then(|total| total.checked_add(Decimal::from(total_delivery_fee)))
        .ok_or(TotalsError::Overflow)?;

    Ok(OrderTotals {
        subtotal,
        tax,
        per_vendor_delivery_fee,
        total_delivery_fee,
        grand_total,
    })
}

fn round_minor(amount: Decimal) -> Result<u64, TotalsError> {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or(TotalsError::Overflow)
}
