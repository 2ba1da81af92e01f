//! Cart store.

use std::{fmt, sync::Arc, time::Duration};

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use rusty_money::iso::{self, Currency};
use storefront::{
    pricing::{CartTotals, PricingError},
    quantity::{Quantity, QuantityError},
};
use tracing::{Span, debug, info, warn};

use crate::{
    domain::{
        carts::{
            errors::CartsServiceError,
            models::{CartLine, CartLineUuid, QuantityChange},
        },
        identities::IdentityUuid,
        products::ProductUuid,
    },
    remote::{BackendError, CartBackend},
};

/// Store-wide settings.
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    /// Currency totals are computed in.
    pub currency: &'static Currency,

    /// Extra attempts for idempotent calls that fail with a network error.
    pub network_retries: u8,

    /// Wait before the first retry. Doubles on each further attempt, up to
    /// [`MAX_RETRY_DELAY`].
    pub retry_delay: Duration,
}

/// Upper bound on the wait between two attempts.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            currency: iso::USD,
            network_retries: 1,
            retry_delay: Duration::from_millis(100),
        }
    }
}

/// The signed-in identity's cart, kept in step with the remote backend.
///
/// Every mutation is written remotely first; local state only changes once the
/// backend has confirmed it.
pub struct CartStore {
    backend: Arc<dyn CartBackend>,
    identity: IdentityUuid,
    options: StoreOptions,
    lines: Vec<CartLine>,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("identity", &self.identity)
            .field("options", &self.options)
            .field("lines", &self.lines)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create an empty store for `identity`. Call [`CartStore::load`] to fetch its cart.
    #[must_use]
    pub fn new(
        backend: Arc<dyn CartBackend>,
        identity: IdentityUuid,
        options: StoreOptions,
    ) -> Self {
        Self {
            backend,
            identity,
            options,
            lines: Vec::new(),
        }
    }

    /// Identity the store acts for.
    pub fn identity(&self) -> IdentityUuid {
        self.identity
    }

    /// Currency totals are computed in.
    pub fn currency(&self) -> &'static Currency {
        self.options.currency
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for `product`, if any.
    pub fn line(&self, product: ProductUuid) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_uuid == product)
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines whose product no longer exists.
    pub fn unavailable_lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter().filter(|line| !line.is_available())
    }

    /// Item count, subtotal and savings for the current lines.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a total overflows or a product is priced in
    /// another currency.
    pub fn totals(&self) -> Result<CartTotals<'static>, PricingError> {
        CartTotals::from_lines(&self.lines, self.options.currency)
    }

    /// Replace local state with the identity's cart from the backend.
    ///
    /// Concurrent sessions can leave more than one line for a product. Those are
    /// folded into the earliest line, with quantities summed, and the backend is
    /// repaired to match before local state is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if a backend call fails. Local state is untouched on error.
    #[tracing::instrument(
        name = "carts.store.load",
        skip(self),
        fields(identity = %self.identity, line_count = tracing::field::Empty),
        err
    )]
    pub async fn load(&mut self) -> Result<(), CartsServiceError> {
        let backend = self.backend.as_ref();
        let identity = self.identity;

        let lines = retrying(self.options, "select_cart_lines", move || {
            backend.select_cart_lines(identity)
        })
        .await?;

        let Collapsed {
            lines,
            merged,
            duplicates,
        } = collapse_duplicates(lines);

        if !duplicates.is_empty() {
            warn!(
                duplicates = duplicates.len(),
                "cart has more than one line per product, merging"
            );

            self.repair_duplicates(&lines, &merged, &duplicates).await?;
        }

        let unavailable = lines.iter().filter(|line| !line.is_available()).count();

        if unavailable > 0 {
            warn!(unavailable, "cart has lines for products that no longer exist");
        }

        Span::current().record("line_count", lines.len());

        self.lines = lines;

        Ok(())
    }

    /// Switch to another identity and load its cart.
    ///
    /// The previous identity's lines are discarded before loading, so a failed
    /// load leaves the store empty rather than showing someone else's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if loading the new identity's cart fails.
    #[tracing::instrument(
        name = "carts.store.change_identity",
        skip(self),
        fields(from = %self.identity, to = %identity),
        err
    )]
    pub async fn change_identity(&mut self, identity: IdentityUuid) -> Result<(), CartsServiceError> {
        self.identity = identity;
        self.lines.clear();

        self.load().await
    }

    /// Add `quantity` units of `product`, merging into an existing line.
    ///
    /// # Errors
    ///
    /// - [`CartsServiceError::InvalidArgument`]: `quantity` is below 1, or the merged
    ///   quantity is too large.
    /// - [`CartsServiceError::NotFound`]: the product does not exist.
    /// - Any backend failure. Local state is untouched on error.
    #[tracing::instrument(
        name = "carts.store.add",
        skip(self),
        fields(identity = %self.identity, product = %product),
        err
    )]
    pub async fn add(&mut self, product: ProductUuid, quantity: i64) -> Result<(), CartsServiceError> {
        let quantity = Quantity::new(quantity)?;

        if let Some(existing) = self.line(product).map(|line| line.quantity) {
            let merged = existing.checked_add(quantity).ok_or_else(|| {
                QuantityError::TooLarge(i64::from(existing) + i64::from(quantity))
            })?;

            self.write_quantity(product, merged).await?;

            return Ok(());
        }

        let backend = self.backend.as_ref();
        let identity = self.identity;

        let snapshot = retrying(self.options, "fetch_product_snapshot", move || {
            backend.fetch_product_snapshot(product)
        })
        .await?;

        if !snapshot.has_stock_for(quantity.get()) {
            warn!(stock = snapshot.stock, requested = %quantity, "adding more than is in stock");
        }

        let uuid = backend
            .insert_cart_line(identity, product, quantity)
            .await?;

        self.lines.push(CartLine {
            uuid,
            product_uuid: product,
            quantity,
            product: Some(snapshot),
            created_at: Timestamp::now(),
        });

        info!(line_uuid = %uuid, %quantity, "added cart line");

        Ok(())
    }

    /// Set the quantity of the line for `product`.
    ///
    /// A quantity below 1 is ignored: nothing is written and
    /// [`QuantityChange::Ignored`] is returned.
    ///
    /// # Errors
    ///
    /// - [`CartsServiceError::InvalidArgument`]: `quantity` is too large.
    /// - [`CartsServiceError::NotFound`]: the cart has no line for `product`.
    /// - Any backend failure. Local state is untouched on error.
    #[tracing::instrument(
        name = "carts.store.set_quantity",
        skip(self),
        fields(identity = %self.identity, product = %product),
        err
    )]
    pub async fn set_quantity(
        &mut self,
        product: ProductUuid,
        quantity: i64,
    ) -> Result<QuantityChange, CartsServiceError> {
        let quantity = match Quantity::new(quantity) {
            Ok(quantity) => quantity,
            Err(QuantityError::NotPositive(requested)) => {
                debug!(requested, "ignoring quantity below one");

                return Ok(QuantityChange::Ignored);
            }
            Err(error) => return Err(error.into()),
        };

        self.write_quantity(product, quantity).await?;

        Ok(QuantityChange::Updated(quantity))
    }

    /// Remove the line for `product`. Does nothing if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend delete fails. Local state is untouched on error.
    #[tracing::instrument(
        name = "carts.store.remove",
        skip(self),
        fields(identity = %self.identity, product = %product),
        err
    )]
    pub async fn remove(&mut self, product: ProductUuid) -> Result<(), CartsServiceError> {
        let Some(line_uuid) = self.line(product).map(|line| line.uuid) else {
            debug!("no line to remove");

            return Ok(());
        };

        let backend = self.backend.as_ref();

        retrying(self.options, "delete_cart_line", move || {
            backend.delete_cart_line(line_uuid)
        })
        .await?;

        self.lines.retain(|line| line.uuid != line_uuid);

        info!(line_uuid = %line_uuid, "removed cart line");

        Ok(())
    }

    /// Delete every line for the identity, remotely and locally.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend delete fails. Local state is untouched on error.
    #[tracing::instrument(
        name = "carts.store.clear",
        skip(self),
        fields(identity = %self.identity),
        err
    )]
    pub async fn clear(&mut self) -> Result<(), CartsServiceError> {
        let backend = self.backend.as_ref();
        let identity = self.identity;

        retrying(self.options, "delete_all_cart_lines", move || {
            backend.delete_all_cart_lines(identity)
        })
        .await?;

        let cleared = self.lines.len();

        self.lines.clear();

        info!(cleared, "cleared cart");

        Ok(())
    }

    async fn repair_duplicates(
        &self,
        lines: &[CartLine],
        merged: &[CartLineUuid],
        duplicates: &[CartLineUuid],
    ) -> Result<(), CartsServiceError> {
        let backend = self.backend.as_ref();

        for line in lines.iter().filter(|line| merged.contains(&line.uuid)) {
            let (uuid, quantity) = (line.uuid, line.quantity);

            retrying(self.options, "update_cart_line_quantity", move || {
                backend.update_cart_line_quantity(uuid, quantity)
            })
            .await?;
        }

        for &uuid in duplicates {
            retrying(self.options, "delete_cart_line", move || {
                backend.delete_cart_line(uuid)
            })
            .await?;
        }

        Ok(())
    }

    async fn write_quantity(
        &mut self,
        product: ProductUuid,
        quantity: Quantity,
    ) -> Result<(), CartsServiceError> {
        let line_uuid = self
            .line(product)
            .map(|line| line.uuid)
            .ok_or(CartsServiceError::NotFound)?;

        let backend = self.backend.as_ref();

        retrying(self.options, "update_cart_line_quantity", move || {
            backend.update_cart_line_quantity(line_uuid, quantity)
        })
        .await?;

        if let Some(line) = self.lines.iter_mut().find(|line| line.uuid == line_uuid) {
            line.quantity = quantity;
        }

        info!(line_uuid = %line_uuid, %quantity, "updated cart line quantity");

        Ok(())
    }
}

/// Run `call`, issuing it again up to `options.network_retries` times while it
/// fails with a network error. Waits between attempts with exponential backoff.
async fn retrying<T, F, Fut>(
    options: StoreOptions,
    operation: &'static str,
    mut call: F,
) -> Result<T, BackendError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BackendError>>,
{
    let mut attempt = 0;
    let mut delay = options.retry_delay.min(MAX_RETRY_DELAY);

    loop {
        match call().await {
            Err(error) if error.is_network() && attempt < options.network_retries => {
                attempt += 1;

                warn!(
                    operation,
                    attempt,
                    %error,
                    delay_ms = delay.as_millis(),
                    "retrying after network failure"
                );

                tokio::time::sleep(delay).await;

                delay = delay.saturating_mul(2).min(MAX_RETRY_DELAY);
            }
            result => return result,
        }
    }
}

struct Collapsed {
    lines: Vec<CartLine>,

    /// Kept lines whose quantity absorbed a duplicate.
    merged: Vec<CartLineUuid>,

    /// Lines folded into an earlier line for the same product.
    duplicates: Vec<CartLineUuid>,
}

/// Fold every line into the earliest line for its product.
fn collapse_duplicates(mut lines: Vec<CartLine>) -> Collapsed {
    lines.sort_by_key(|line| line.created_at);

    let mut kept: Vec<CartLine> = Vec::with_capacity(lines.len());
    let mut positions: FxHashMap<ProductUuid, usize> = FxHashMap::default();
    let mut merged = Vec::new();
    let mut duplicates = Vec::new();

    for line in lines {
        let earlier = positions
            .get(&line.product_uuid)
            .copied()
            .and_then(|position| kept.get_mut(position));

        if let Some(first) = earlier {
            // Saturate at the larger quantity rather than fail on overflow.
            first.quantity = first
                .quantity
                .checked_add(line.quantity)
                .unwrap_or(first.quantity.max(line.quantity));

            if !merged.contains(&first.uuid) {
                merged.push(first.uuid);
            }

            duplicates.push(line.uuid);
        } else {
            positions.insert(line.product_uuid, kept.len());
            kept.push(line);
        }
    }

    Collapsed {
        lines: kept,
        merged,
        duplicates,
    }
}
