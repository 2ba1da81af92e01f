//! Application configuration

use clap::Args;
use thiserror::Error;

use crate::config::{backend::BackendConfig, observability::LoggingConfig, store::StoreConfig};

pub mod backend;
pub mod observability;
pub mod store;

pub use observability::LogFormat;

/// Errors raised while turning parsed arguments into runtime settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The currency code is not a known ISO 4217 code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Settings shared by every command.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Remote backend connection settings.
    #[command(flatten)]
    pub backend: BackendConfig,

    /// Cart store settings.
    #[command(flatten)]
    pub store: StoreConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}
