//! Remote collaborator
//!
//! The cart store only talks to durable storage through [`CartBackend`].
//! Authorization is left to the backend, keyed on the caller's identity.

use async_trait::async_trait;
use mockall::automock;
use storefront::quantity::Quantity;

use crate::domain::{
    carts::models::{CartLine, CartLineUuid},
    identities::IdentityUuid,
    products::{ProductUuid, Snapshot},
};

mod errors;
pub mod memory;
pub mod rest;

pub use errors::BackendError;
pub use memory::InMemoryBackend;
pub use rest::{RestBackend, RestBackendConfig};

/// Durable storage for cart lines and the product catalog.
///
/// Calls are scoped to the caller's identity by the backend's own policies.
#[automock]
#[async_trait]
pub trait CartBackend: Send + Sync {
    /// All cart lines for `identity`, joined with their product snapshots.
    async fn select_cart_lines(&self, identity: IdentityUuid)
    -> Result<Vec<CartLine>, BackendError>;

    /// Insert a new cart line and return its identifier.
    async fn insert_cart_line(
        &self,
        identity: IdentityUuid,
        product: ProductUuid,
        quantity: Quantity,
    ) -> Result<CartLineUuid, BackendError>;

    /// Overwrite the quantity of an existing line.
    async fn update_cart_line_quantity(
        &self,
        line: CartLineUuid,
        quantity: Quantity,
    ) -> Result<(), BackendError>;

    /// Delete a single line. Deleting a missing line succeeds.
    async fn delete_cart_line(&self, line: CartLineUuid) -> Result<(), BackendError>;

    /// Delete every line belonging to `identity`.
    async fn delete_all_cart_lines(&self, identity: IdentityUuid) -> Result<(), BackendError>;

    /// Current price, discount and stock for a product.
    async fn fetch_product_snapshot(&self, product: ProductUuid)
    -> Result<Snapshot, BackendError>;
}
