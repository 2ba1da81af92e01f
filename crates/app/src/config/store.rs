//! Store Config

use std::time::Duration;

use clap::Args;
use rusty_money::{Findable, iso::Currency};

use crate::{config::ConfigError, domain::carts::StoreOptions};

/// Cart store settings.
#[derive(Debug, Args)]
pub struct StoreConfig {
    /// ISO 4217 code of the catalog currency
    #[arg(long, env = "STOREFRONT_CURRENCY", default_value = "USD")]
    pub currency: String,

    /// Extra attempts for idempotent calls after a network failure
    #[arg(long, env = "STOREFRONT_NETWORK_RETRIES", default_value_t = 1_u8)]
    pub network_retries: u8,

    /// Wait before the first retry in milliseconds, doubled on each further attempt
    #[arg(long, env = "STOREFRONT_RETRY_DELAY_MS", default_value_t = 100_u64)]
    pub retry_delay_ms: u64,
}

impl StoreConfig {
    /// The configured catalog currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] for an unrecognised code.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        Currency::find(&self.currency.to_ascii_uppercase())
            .ok_or_else(|| ConfigError::UnknownCurrency(self.currency.clone()))
    }

    /// Store options built from these settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] for an unrecognised code.
    pub fn options(&self) -> Result<StoreOptions, ConfigError> {
        Ok(StoreOptions {
            currency: self.currency()?,
            network_retries: self.network_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        })
    }
}
