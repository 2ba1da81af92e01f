//! Backend Config

use std::{fmt, time::Duration};

use clap::Args;
use rusty_money::iso::Currency;
use zeroize::Zeroizing;

use crate::remote::RestBackendConfig;

/// Remote backend settings.
#[derive(Args)]
pub struct BackendConfig {
    /// Base URL of the backend project
    #[arg(long, env = "STOREFRONT_BACKEND_URL")]
    pub backend_url: String,

    /// Public API key sent with every request
    #[arg(long, env = "STOREFRONT_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Access token of the signed-in identity
    #[arg(long, env = "STOREFRONT_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// Per-request timeout in seconds (0 disables the timeout)
    #[arg(long, env = "STOREFRONT_REQUEST_TIMEOUT_SECONDS", default_value_t = 10_u64)]
    pub request_timeout_seconds: u64,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("backend_url", &self.backend_url)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish_non_exhaustive()
    }
}

impl BackendConfig {
    /// Connection settings for a [`RestBackend`](crate::remote::RestBackend), consuming the secrets.
    #[must_use]
    pub fn into_rest_config(self, currency: &'static Currency) -> RestBackendConfig {
        let timeout = (self.request_timeout_seconds > 0)
            .then(|| Duration::from_secs(self.request_timeout_seconds));

        RestBackendConfig {
            url: self.backend_url,
            api_key: Zeroizing::new(self.api_key),
            access_token: Zeroizing::new(self.access_token),
            currency,
            timeout,
        }
    }
}
