//! Products

use rusty_money::{Money, iso::Currency};

use crate::pricing::discount_percent;

/// The fields of a product needed to price it in a cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductSnapshot<'a> {
    /// List price
    pub price: Money<'a, Currency>,

    /// Discounted price, if the product is on sale
    pub discount_price: Option<Money<'a, Currency>>,

    /// Units available
    pub stock: u32,
}

impl<'a> ProductSnapshot<'a> {
    /// Create a snapshot with no discount.
    pub fn new(price: Money<'a, Currency>, stock: u32) -> Self {
        Self {
            price,
            discount_price: None,
            stock,
        }
    }

    /// Set the discounted price.
    #[must_use]
    pub fn with_discount(mut self, discount_price: Money<'a, Currency>) -> Self {
        self.discount_price = Some(discount_price);
        self
    }

    /// The price a customer actually pays per unit.
    pub fn effective_price(&self) -> Money<'a, Currency> {
        self.discount_price.unwrap_or(self.price)
    }

    /// The discount as whole percent points of the list price.
    pub fn discount_percent(&self) -> Option<i64> {
        discount_percent(&self.price, self.discount_price.as_ref())
    }

    /// Whether `requested` units can be supplied from current stock.
    pub fn has_stock_for(&self, requested: u32) -> bool {
        requested <= self.stock
    }
}
