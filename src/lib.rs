//! Storefront
//!
//! Cart pricing for the storefront: product snapshots, line quantities and the
//! aggregation of line totals, subtotals, item counts and discounts.

pub mod pricing;
pub mod products;
pub mod quantity;

pub mod prelude;
