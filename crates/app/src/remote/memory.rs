//! In-memory backend

use async_trait::async_trait;
use jiff::Timestamp;
use rustc_hash::FxHashMap;
use storefront::quantity::Quantity;
use tokio::sync::Mutex;

use crate::{
    domain::{
        carts::models::{CartLine, CartLineUuid},
        identities::IdentityUuid,
        products::{ProductUuid, Snapshot},
    },
    remote::{BackendError, CartBackend},
};

#[derive(Debug, Clone)]
struct StoredLine {
    uuid: CartLineUuid,
    identity: IdentityUuid,
    product_uuid: ProductUuid,
    quantity: Quantity,
    created_at: Timestamp,
}

#[derive(Debug, Default)]
struct State {
    products: FxHashMap<ProductUuid, Snapshot>,
    lines: Vec<StoredLine>,
}

/// A [`CartBackend`] that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: Mutex<State>,
}

impl InMemoryBackend {
    /// Create a backend with an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend seeded with the given catalog.
    #[must_use]
    pub fn with_products(products: impl IntoIterator<Item = (ProductUuid, Snapshot)>) -> Self {
        Self {
            state: Mutex::new(State {
                products: products.into_iter().collect(),
                lines: Vec::new(),
            }),
        }
    }

    /// Add or replace a catalog entry.
    pub async fn put_product(&self, product: ProductUuid, snapshot: Snapshot) {
        self.state.lock().await.products.insert(product, snapshot);
    }

    /// Drop a product from the catalog, leaving any cart lines pointing at it.
    pub async fn remove_product(&self, product: ProductUuid) {
        self.state.lock().await.products.remove(&product);
    }

    /// Number of stored lines for `identity`.
    pub async fn line_count(&self, identity: IdentityUuid) -> usize {
        self.state
            .lock()
            .await
            .lines
            .iter()
            .filter(|line| line.identity == identity)
            .count()
    }
}

#[async_trait]
impl CartBackend for InMemoryBackend {
    async fn select_cart_lines(
        &self,
        identity: IdentityUuid,
    ) -> Result<Vec<CartLine>, BackendError> {
        let state = self.state.lock().await;

        let lines = state
            .lines
            .iter()
            .filter(|line| line.identity == identity)
            .map(|line| CartLine {
                uuid: line.uuid,
                product_uuid: line.product_uuid,
                quantity: line.quantity,
                product: state.products.get(&line.product_uuid).copied(),
                created_at: line.created_at,
            })
            .collect();

        Ok(lines)
    }

    async fn insert_cart_line(
        &self,
        identity: IdentityUuid,
        product: ProductUuid,
        quantity: Quantity,
    ) -> Result<CartLineUuid, BackendError> {
        let mut state = self.state.lock().await;

        if !state.products.contains_key(&product) {
            return Err(BackendError::NotFound);
        }

        let uuid = CartLineUuid::new();

        state.lines.push(StoredLine {
            uuid,
            identity,
            product_uuid: product,
            quantity,
            created_at: Timestamp::now(),
        });

        Ok(uuid)
    }

    async fn update_cart_line_quantity(
        &self,
        line: CartLineUuid,
        quantity: Quantity,
    ) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;

        let stored = state
            .lines
            .iter_mut()
            .find(|stored| stored.uuid == line)
            .ok_or(BackendError::NotFound)?;

        stored.quantity = quantity;

        Ok(())
    }

    async fn delete_cart_line(&self, line: CartLineUuid) -> Result<(), BackendError> {
        self.state
            .lock()
            .await
            .lines
            .retain(|stored| stored.uuid != line);

        Ok(())
    }

    async fn delete_all_cart_lines(&self, identity: IdentityUuid) -> Result<(), BackendError> {
        self.state
            .lock()
            .await
            .lines
            .retain(|stored| stored.identity != identity);

        Ok(())
    }

    async fn fetch_product_snapshot(&self, product: ProductUuid) -> Result<Snapshot, BackendError> {
        self.state
            .lock()
            .await
            .products
            .get(&product)
            .copied()
            .ok_or(BackendError::NotFound)
    }
}
