//! Carts

pub mod errors;
pub mod models;
pub mod store;

pub use errors::CartsServiceError;
pub use models::{CartLine, CartLineUuid, QuantityChange};
pub use store::{CartStore, StoreOptions};
