//! Authentication error types.

use core::fmt;

use thiserror::Error;

use crate::api::ApiError;

/// Per-field validation messages, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(&'static str, String)>);

impl FieldErrors {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Record a message for `field`. The first message per field wins.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        if self.get(field).is_none() {
            self.0.push((field, message.into()));
        }
    }

    /// The message for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, message)| message.as_str())
    }

    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(field, message)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the collected errors when at least one field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Client-side field validation failed; nothing was sent.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Email/password rejected by the backend.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The request could not complete.
    #[error("network error: {0}")]
    Network(ApiError),

    /// The backend answered with an error.
    #[error("server error: {0}")]
    Server(ApiError),
}

impl AuthError {
    /// Classify a login failure. Rejected credentials surface as 401, 404 or
    /// 400 depending on the backend path taken.
    pub(crate) fn from_login(err: ApiError) -> Self {
        match err.status() {
            Some(400 | 401 | 404) => Self::InvalidCredentials,
            _ => Self::from(err),
        }
    }
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err.kind() {
            crate::api::ErrorKind::Network => Self::Network(err),
            _ => Self::Server(err),
        }
    }
}

impl From<FieldErrors> for AuthError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_first_message_wins() {
        let mut errors = FieldErrors::new();
        errors.insert("email", "Email is required");
        errors.insert("email", "Please enter a valid email address");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("email"), Some("Email is required"));
    }

    #[test]
    fn test_field_errors_display_keeps_order() {
        let mut errors = FieldErrors::new();
        errors.insert("phone", "Phone number must be exactly 10 digits");
        errors.insert("password", "Password must be at least 8 characters");
        assert_eq!(
            errors.to_string(),
            "phone: Phone number must be exactly 10 digits; password: Password must be at least 8 characters"
        );
    }

    #[test]
    fn test_login_error_classification() {
        assert!(matches!(
            AuthError::from_login(ApiError::Unauthorized("bad".to_string())),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            AuthError::from_login(ApiError::Server {
                status: 400,
                message: "Invalid email or password".to_string()
            }),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            AuthError::from_login(ApiError::Server {
                status: 503,
                message: "down".to_string()
            }),
            AuthError::Server(_)
        ));
    }
}
