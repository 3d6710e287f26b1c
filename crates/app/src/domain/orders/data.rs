//! Orders Data

use dishpatch::{
    RoundedTotals, TaxRate, VendorCartGroup,
    checkout::ContactDetails,
    schedule::DeliverySchedule,
    totals::{TotalsError, money},
};
use jiff::tz::TimeZone;
use rusty_money::iso::{self, Currency};

use crate::domain::orders::records::{OrderRecord, OrderStatus, OrderUuid};

/// Default page size for order listings.
pub const DEFAULT_PER_PAGE: u32 = 25;

/// Largest page size a caller may request.
pub const MAX_PER_PAGE: u32 = 100;

/// New Order Data
///
/// Any searchable id the client sends is dropped before this is built.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub contact: ContactDetails,
    pub schedule: DeliverySchedule,
    pub groups: Vec<VendorCartGroup>,

    /// Totals the customer was shown, compared against the server's and otherwise ignored.
    pub client_totals: Option<RoundedTotals>,
}

/// Server-side checkout settings.
#[derive(Debug, Clone)]
pub struct CheckoutPolicy {
    pub tax_rate: TaxRate,

    /// Zone delivery schedules are interpreted in.
    pub time_zone: TimeZone,

    /// Currency every amount is denominated in.
    pub currency: &'static Currency,
}

impl CheckoutPolicy {
    /// Format an amount in minor units for display, e.g. `$43.06`.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsError::Overflow`] when the amount is too large to format.
    pub fn display_amount(&self, minor: u64) -> Result<String, TotalsError> {
        Ok(money(minor, self.currency)?.to_string())
    }
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            tax_rate: TaxRate::zero(),
            time_zone: TimeZone::UTC,
            currency: iso::USD,
        }
    }
}

/// Order listing filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery {
    /// Free text matched against ids, contact details and store names.
    pub search: Option<String>,
    pub status: Option<OrderStatus>,

    /// One-based page number.
    pub page: u32,
    pub per_page: u32,
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl OrderQuery {
    /// Clamp paging to supported bounds.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.per_page = self.per_page.clamp(1, MAX_PER_PAGE);

        self
    }

    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }
}

/// A page of orders, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPage {
    pub orders: Vec<OrderRecord>,

    /// Number of orders matching the filters across all pages.
    pub total: u64,

    pub page: u32,
    pub per_page: u32,
}

/// Outcome of a searchable id backfill run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    /// Rows that received an id.
    pub assigned: u64,

    /// Conflicting candidates that had to be regenerated.
    pub retries: u64,
}
