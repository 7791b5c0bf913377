//! Storefront REST API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP via `reqwest`; every response body is wrapped in
//!   a `{ "data": ... }` envelope that the client unwraps uniformly
//! - The backend is the source of truth for carts, wishlists and pricing
//! - In-memory caching via `moka` keyed by [`CacheKey`]; concurrent reads of
//!   the same key share one in-flight request
//! - Every mutation declares the [`CacheTag`]s it invalidates
//!
//! # Example
//!
//! ```rust,ignore
//! use petal_storefront::api::{AddToCartInput, ApiClient, CartOwner};
//!
//! let client = ApiClient::new(&config.api, credentials.subscribe())?;
//!
//! let product = client.product(&product_id).await?;
//! let cart = client
//!     .add_to_cart(&CartOwner::Guest(session_id), &AddToCartInput::new(product.id, Quantity::ONE))
//!     .await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use cache::{CacheKey, CacheTag, CacheValue};
pub use client::ApiClient;
pub use types::*;

use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur when talking to the storefront backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be completed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response with a server-provided message.
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The bearer token was missing, expired or rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request conflicts with current server state (e.g. repeated merge).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A cache entry held a value of the wrong shape for its key.
    #[error("Unexpected cache entry for {0}")]
    CacheMismatch(String),

    /// Error observed by a caller that joined another caller's in-flight request.
    #[error("{0}")]
    Shared(Arc<ApiError>),
}

/// Coarse classification of failures, as surfaced to the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request could not complete.
    Network,
    /// The backend answered with a non-2xx status.
    Server,
    /// The backend reported a conflict; callers ignore these where noted.
    Conflict,
}

impl ApiError {
    /// Classify the error into the storefront error taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) => ErrorKind::Network,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Shared(inner) => inner.kind(),
            Self::Server { .. }
            | Self::Unauthorized(_)
            | Self::NotFound(_)
            | Self::RateLimited(_)
            | Self::Parse(_)
            | Self::Url(_)
            | Self::CacheMismatch(_) => ErrorKind::Server,
        }
    }

    /// HTTP status associated with the error, if the backend answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Unauthorized(_) => Some(401),
            Self::NotFound(_) => Some(404),
            Self::Conflict(_) => Some(409),
            Self::RateLimited(_) => Some(429),
            Self::Shared(inner) => inner.status(),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Parse(_) | Self::Url(_) | Self::CacheMismatch(_) => None,
        }
    }

    /// Whether the error is a conflict, including one seen through a shared request.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    /// Recover an owned error from a shared one when no other caller holds it.
    pub(crate) fn from_shared(err: Arc<Self>) -> Self {
        Arc::try_unwrap(err).unwrap_or_else(Self::Shared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("product 42".to_string());
        assert_eq!(err.to_string(), "Not found: product 42");

        let err = ApiError::Server {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Server error (500): boom");
    }

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(
            ApiError::Conflict("already merged".to_string()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            ApiError::Unauthorized("expired".to_string()).kind(),
            ErrorKind::Server
        );
        assert_eq!(ApiError::RateLimited(5).status(), Some(429));
    }

    #[test]
    fn test_shared_error_keeps_classification() {
        let shared = ApiError::Shared(Arc::new(ApiError::Conflict("dup".to_string())));
        assert!(shared.is_conflict());
        assert_eq!(shared.status(), Some(409));
        assert_eq!(shared.to_string(), "Conflict: dup");
    }

    #[test]
    fn test_from_shared_unwraps_unique_arc() {
        let err = ApiError::from_shared(Arc::new(ApiError::RateLimited(1)));
        assert!(matches!(err, ApiError::RateLimited(1)));
    }
}
