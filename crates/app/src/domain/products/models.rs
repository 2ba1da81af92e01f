//! Product Models

use storefront::products::ProductSnapshot;

use crate::uuids::TypedUuid;

/// A product in the remote catalog.
#[derive(Debug)]
pub struct Product;

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Product snapshot priced in an ISO currency.
pub type Snapshot = ProductSnapshot<'static>;
