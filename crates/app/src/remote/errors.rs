//! Remote collaborator errors.

use thiserror::Error;

/// Errors returned by a [`CartBackend`](super::CartBackend).
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request did not complete.
    #[error("request did not complete")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The referenced row does not exist.
    #[error("resource not found")]
    NotFound,

    /// The backend answered with a non-success status.
    #[error("backend responded with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,

        /// Response body, usually the backend's error message.
        body: String,
    },

    /// The response did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl BackendError {
    /// Whether the call may succeed if issued again.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return Self::Malformed(error.to_string());
        }

        Self::Network(Box::new(error))
    }
}
