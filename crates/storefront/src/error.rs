//! Unified error handling with Sentry integration.
//!
//! Provides a unified `StorefrontError` type for facade operations and maps
//! each failure onto what the user sees: inline field messages, a transient
//! toast, or a persistent banner with a retry action.

use thiserror::Error;

use crate::api::{ApiError, ErrorKind};
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::services::auth::{AuthError, FieldErrors};
use crate::store::StoreError;

/// Storefront-level error type.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Login, signup or validation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// A cart or wishlist intent failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Checkout could not proceed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

/// What kind of operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Reading a cart, wishlist or profile.
    Load,
    /// Changing server state.
    Mutation,
}

/// User-visible presentation of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Per-field messages shown next to form inputs.
    Inline(FieldErrors),
    /// Transient notification.
    Toast(String),
    /// Persistent banner, optionally with a retry action.
    Banner { message: String, retry: bool },
}

impl StorefrontError {
    /// The underlying API error, if any.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e)
            | Self::Store(StoreError::Api(e))
            | Self::Auth(AuthError::Network(e) | AuthError::Server(e)) => Some(e),
            _ => None,
        }
    }

    /// Whether the error is a conflict that callers ignore.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_conflict)
    }

    /// Message safe to show to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(AuthError::InvalidCredentials) => "Invalid email or password".to_string(),
            Self::Auth(AuthError::Validation(fields)) => fields.to_string(),
            Self::Store(StoreError::SignInRequired) => "Please sign in to continue".to_string(),
            Self::Store(StoreError::ItemNotFound(_)) => {
                "That item is no longer in your cart".to_string()
            }
            Self::Store(StoreError::InvalidQuantity(e)) => e.to_string(),
            Self::Checkout(e) => e.to_string(),
            Self::Config(_) => "The storefront is not configured".to_string(),
            _ => self.api_error().map_or_else(|| self.to_string(), api_message),
        }
    }

    /// How to present this error after `operation` failed.
    ///
    /// Returns `None` for conflicts, which are not surfaced.
    #[must_use]
    pub fn notice(&self, operation: Operation) -> Option<Notice> {
        if self.is_conflict() {
            return None;
        }
        if let Self::Auth(AuthError::Validation(fields)) = self {
            return Some(Notice::Inline(fields.clone()));
        }

        let message = self.user_message();
        Some(match operation {
            Operation::Load => Notice::Banner {
                message,
                retry: true,
            },
            Operation::Mutation => Notice::Toast(message),
        })
    }

    /// Capture network and server failures to Sentry and log them.
    pub fn report(&self) {
        if self
            .api_error()
            .is_some_and(|e| matches!(e.kind(), ErrorKind::Network | ErrorKind::Server))
        {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        }
    }
}

/// Don't expose internal error details to users.
fn api_message(err: &ApiError) -> String {
    match err {
        ApiError::Http(_) => "Could not reach the store. Check your connection.".to_string(),
        ApiError::Server { message, .. } => message.clone(),
        ApiError::Unauthorized(_) => "Your session has expired. Please sign in again.".to_string(),
        ApiError::NotFound(_) => "Not found".to_string(),
        ApiError::RateLimited(secs) => format!("Too many requests. Try again in {secs}s."),
        ApiError::Shared(inner) => api_message(inner),
        ApiError::Conflict(_)
        | ApiError::Parse(_)
        | ApiError::Url(_)
        | ApiError::CacheMismatch(_) => "Something went wrong. Please try again.".to_string(),
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "665f1c")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
