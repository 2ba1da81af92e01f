//! Storefront Domain Concerns

pub mod carts;
pub mod identities;
pub mod products;
