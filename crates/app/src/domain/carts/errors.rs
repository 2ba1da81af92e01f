//! Cart store errors.

use storefront::{pricing::PricingError, quantity::QuantityError};
use thiserror::Error;

use crate::remote::BackendError;

/// Errors returned by [`CartStore`](super::CartStore) operations.
#[derive(Debug, Error)]
pub enum CartsServiceError {
    /// The remote call did not complete, even after retrying.
    #[error("remote call did not complete")]
    NetworkFailure(#[source] BackendError),

    /// The referenced product or cart line does not exist.
    #[error("product or cart line not found")]
    NotFound,

    /// The quantity is below 1 or too large.
    #[error("invalid quantity")]
    InvalidArgument(#[from] QuantityError),

    /// The backend answered with an unexpected shape.
    #[error("malformed response from backend: {0}")]
    MalformedResponse(String),

    /// The backend refused the request, e.g. an authorization policy denial.
    #[error("backend rejected the request with status {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
    },

    /// A total overflowed or mixed currencies.
    #[error("failed to price cart")]
    Pricing(#[from] PricingError),
}

impl From<BackendError> for CartsServiceError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::NotFound => Self::NotFound,
            BackendError::Malformed(detail) => Self::MalformedResponse(detail),
            BackendError::Rejected { status, .. } => Self::Rejected { status },
            BackendError::Network(_) => Self::NetworkFailure(error),
        }
    }
}
