//! HTTP backend for a PostgREST-style data API.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use rusty_money::iso::Currency;
use serde::de::DeserializeOwned;
use serde_json::json;
use storefront::quantity::Quantity;
use tracing::debug;
use zeroize::Zeroizing;

use crate::{
    domain::{
        carts::models::{CartLine, CartLineUuid},
        identities::IdentityUuid,
        products::{ProductUuid, Snapshot},
    },
    remote::{BackendError, CartBackend},
};

use rows::{CART_LINE_COLUMNS, CartLineRow, IdRow, PRODUCT_COLUMNS, ProductRow, single};

mod rows;

const CART_ITEMS: &str = "cart_items";
const PRODUCTS: &str = "products";

/// Connection settings for [`RestBackend`].
pub struct RestBackendConfig {
    /// Base URL of the project, e.g. `"https://shop.example.com"`.
    pub url: String,

    /// Public API key sent with every request.
    pub api_key: Zeroizing<String>,

    /// Access token of the signed-in identity.
    pub access_token: Zeroizing<String>,

    /// Currency that catalog prices are stored in.
    pub currency: &'static Currency,

    /// Per-request timeout. The client default applies when `None`.
    pub timeout: Option<Duration>,
}

impl fmt::Debug for RestBackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestBackendConfig")
            .field("url", &self.url)
            .field("currency", &self.currency.iso_alpha_code)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// [`CartBackend`] over HTTP.
pub struct RestBackend {
    http: Client,
    base_url: String,
    api_key: Zeroizing<String>,
    access_token: Zeroizing<String>,
    currency: &'static Currency,
}

impl fmt::Debug for RestBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestBackend")
            .field("base_url", &self.base_url)
            .field("currency", &self.currency.iso_alpha_code)
            .finish_non_exhaustive()
    }
}

impl RestBackend {
    /// Build a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: RestBackendConfig) -> Result<Self, BackendError> {
        let mut builder = Client::builder();

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            access_token: config.access_token,
            currency: config.currency,
        })
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, self.endpoint(table))
            .header("apikey", self.api_key.as_str())
            .bearer_auth(self.access_token.as_str())
    }

    async fn send(builder: RequestBuilder) -> Result<Response, BackendError> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            return Err(BackendError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, BackendError> {
        Ok(Self::send(builder).await?.json().await?)
    }
}

#[async_trait]
impl CartBackend for RestBackend {
    async fn select_cart_lines(
        &self,
        identity: IdentityUuid,
    ) -> Result<Vec<CartLine>, BackendError> {
        let rows: Vec<CartLineRow> = Self::fetch(
            self.request(Method::GET, CART_ITEMS).query(&[
                ("select", CART_LINE_COLUMNS.to_string()),
                ("user_id", format!("eq.{identity}")),
                ("order", "created_at.asc".to_string()),
            ]),
        )
        .await?;

        debug!(rows = rows.len(), "selected cart lines");

        rows.into_iter()
            .map(|row| row.into_line(self.currency))
            .collect()
    }

    async fn insert_cart_line(
        &self,
        identity: IdentityUuid,
        product: ProductUuid,
        quantity: Quantity,
    ) -> Result<CartLineUuid, BackendError> {
        let rows: Vec<IdRow> = Self::fetch(
            self.request(Method::POST, CART_ITEMS)
                .query(&[("select", "id")])
                .header("Prefer", "return=representation")
                .json(&json!({
                    "user_id": identity,
                    "product_id": product,
                    "quantity": quantity,
                })),
        )
        .await?;

        single(rows)?
            .map(|row| CartLineUuid::from_uuid(row.id))
            .ok_or_else(|| BackendError::Malformed("insert returned no rows".to_string()))
    }

    async fn update_cart_line_quantity(
        &self,
        line: CartLineUuid,
        quantity: Quantity,
    ) -> Result<(), BackendError> {
        let rows: Vec<IdRow> = Self::fetch(
            self.request(Method::PATCH, CART_ITEMS)
                .query(&[("select", "id".to_string()), ("id", format!("eq.{line}"))])
                .header("Prefer", "return=representation")
                .json(&json!({ "quantity": quantity })),
        )
        .await?;

        single(rows)?.map(|_| ()).ok_or(BackendError::NotFound)
    }

    async fn delete_cart_line(&self, line: CartLineUuid) -> Result<(), BackendError> {
        Self::send(
            self.request(Method::DELETE, CART_ITEMS)
                .query(&[("id", format!("eq.{line}"))]),
        )
        .await?;

        Ok(())
    }

    async fn delete_all_cart_lines(&self, identity: IdentityUuid) -> Result<(), BackendError> {
        Self::send(
            self.request(Method::DELETE, CART_ITEMS)
                .query(&[("user_id", format!("eq.{identity}"))]),
        )
        .await?;

        Ok(())
    }

    async fn fetch_product_snapshot(&self, product: ProductUuid) -> Result<Snapshot, BackendError> {
        let rows: Vec<ProductRow> = Self::fetch(
            self.request(Method::GET, PRODUCTS).query(&[
                ("select", PRODUCT_COLUMNS.to_string()),
                ("id", format!("eq.{product}")),
            ]),
        )
        .await?;

        single(rows)?
            .ok_or(BackendError::NotFound)?
            .into_snapshot(self.currency)
    }
}
