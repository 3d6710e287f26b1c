//! Checkout Config

use clap::Args;
use jiff::tz::TimeZone;
use rusty_money::iso;
use thiserror::Error;

use dishpatch::{TaxRate, totals::TotalsError};
use dishpatch_app::domain::orders::data::CheckoutPolicy;

/// Errors turning checkout settings into a policy.
#[derive(Debug, Error)]
pub enum CheckoutConfigError {
    /// The tax rate is negative or not a number.
    #[error("invalid tax rate: {0}")]
    TaxRate(#[from] TotalsError),

    /// The time zone is not in the tz database.
    #[error("unknown delivery time zone: {0}")]
    TimeZone(#[from] jiff::Error),

    /// The currency is not an ISO 4217 code.
    #[error("unknown currency \"{0}\"")]
    Currency(String),
}

/// Checkout settings.
#[derive(Debug, Args)]
pub struct CheckoutConfig {
    /// Sales tax as a fraction of the subtotal, e.g. 0.08
    #[arg(long, env = "TAX_RATE", default_value_t = 0.0)]
    pub tax_rate: f64,

    /// IANA time zone delivery schedules are interpreted in
    #[arg(long, env = "DELIVERY_TIME_ZONE", default_value = "UTC")]
    pub delivery_time_zone: String,

    /// ISO 4217 currency code of all amounts
    #[arg(long, env = "CURRENCY", default_value = "USD")]
    pub currency: String,
}

impl CheckoutConfig {
    /// Build the policy orders are priced and validated with.
    ///
    /// # Errors
    ///
    /// Returns an error when any setting is invalid.
    pub fn policy(&self) -> Result<CheckoutPolicy, CheckoutConfigError> {
        let currency = iso::find(&self.currency)
            .ok_or_else(|| CheckoutConfigError::Currency(self.currency.clone()))?;

        Ok(CheckoutPolicy {
            tax_rate: TaxRate::from_fraction(self.tax_rate)?,
            time_zone: TimeZone::get(&self.delivery_time_zone)?,
            currency,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn config(tax_rate: f64, zone: &str, currency: &str) -> CheckoutConfig {
        CheckoutConfig {
            tax_rate,
            delivery_time_zone: zone.to_string(),
            currency: currency.to_string(),
        }
    }

    #[test]
    fn builds_policy_from_valid_settings() -> TestResult {
        let policy = config(0.08, "UTC", "EUR").policy()?;

        assert_eq!(policy.currency, iso::EUR);

        Ok(())
    }

    #[test]
    fn rejects_negative_tax_rate() {
        assert!(matches!(
            config(-0.1, "UTC", "USD").policy(),
            Err(CheckoutConfigError::TaxRate(_))
        ));
    }

    #[test]
    fn rejects_unknown_currency() {
        assert!(matches!(
            config(0.0, "UTC", "XYZ").policy(),
            Err(CheckoutConfigError::Currency(code)) if code == "XYZ"
        ));
    }
}
