//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    pricing::{
        CartTotals, Line, PricedLine, PricingError, discount_percent, item_count, line_total,
        savings, subtotal,
    },
    products::ProductSnapshot,
    quantity::{Quantity, QuantityError},
};
