//! Identities

use crate::uuids::TypedUuid;

/// The authenticated user a cart belongs to.
#[derive(Debug)]
pub struct Identity;

/// Identity UUID
pub type IdentityUuid = TypedUuid<Identity>;
