//! Server configuration module

use clap::Parser;

use crate::config::{
    checkout::CheckoutConfig, db::DatabaseConfig, logging::LoggingConfig,
    server::ServerRuntimeConfig,
};

pub(crate) mod checkout;
pub(crate) mod db;
pub(crate) mod logging;
pub(crate) mod server;

pub(crate) use logging::LogFormat;

/// Dishpatch JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "dishpatch-json", about = "Dishpatch JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Tax, currency and delivery time zone settings.
    #[command(flatten)]
    pub checkout: CheckoutConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_flags_over_defaults() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "dishpatch-json",
            "--database-url",
            "postgres://localhost/dishpatch",
            "--port",
            "9000",
            "--tax-rate",
            "0.08",
        ])?;

        assert_eq!(config.socket_addr(), "0.0.0.0:9000");
        assert_eq!(config.database.database_url, "postgres://localhost/dishpatch");
        assert!(
            (config.checkout.tax_rate - 0.08).abs() < f64::EPSILON,
            "tax rate flag should be parsed"
        );
        assert_eq!(config.checkout.currency, "USD");

        Ok(())
    }
}
