//! Cart Models

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use storefront::{
    pricing::{PricedLine, PricingError, line_total},
    products::ProductSnapshot,
    quantity::Quantity,
};

use crate::{
    domain::products::{ProductUuid, Snapshot},
    uuids::TypedUuid,
};

/// Cart Line UUID
pub type CartLineUuid = TypedUuid<CartLine>;

/// One product and quantity in an identity's cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// Line identifier.
    pub uuid: CartLineUuid,

    /// Product the line is for.
    pub product_uuid: ProductUuid,

    /// Units in the cart, always at least one.
    pub quantity: Quantity,

    /// `None` when the product has been removed from the catalog.
    pub product: Option<Snapshot>,

    /// When the line was first added.
    pub created_at: Timestamp,
}

impl CartLine {
    /// Whether the product behind this line still exists.
    pub fn is_available(&self) -> bool {
        self.product.is_some()
    }

    /// Line total, or `None` for an unavailable product.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the total overflows.
    pub fn line_total(&self) -> Result<Option<Money<'static, Currency>>, PricingError> {
        self.product
            .as_ref()
            .map(|snapshot| line_total(snapshot, self.quantity))
            .transpose()
    }

    /// Discount off the list price in percent points.
    pub fn discount_percent(&self) -> Option<i64> {
        self.product.as_ref().and_then(Snapshot::discount_percent)
    }

    /// Whether current stock covers the line quantity.
    pub fn is_in_stock(&self) -> bool {
        self.product
            .as_ref()
            .is_some_and(|snapshot| snapshot.has_stock_for(self.quantity.get()))
    }
}

impl PricedLine<'static> for CartLine {
    fn snapshot(&self) -> Option<&ProductSnapshot<'static>> {
        self.product.as_ref()
    }

    fn quantity(&self) -> Quantity {
        self.quantity
    }
}

/// Result of a quantity update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line now holds this quantity.
    Updated(Quantity),

    /// The requested quantity was below one and nothing changed.
    Ignored,
}
