//! Anonymous guest session identifier.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for an unauthenticated visitor's cart.
///
/// Formatted as `session_<uuid>`. The value is opaque to the backend; it is
/// only ever used as a path segment for guest cart endpoints and as the body
/// of the merge request at login.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestSessionId(String);

impl GuestSessionId {
    /// Prefix carried by every generated identifier.
    pub const PREFIX: &'static str = "session_";

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{}{}", Self::PREFIX, Uuid::new_v4()))
    }

    /// Wrap a previously persisted identifier.
    ///
    /// Returns `None` for blank input so a corrupted store entry is treated
    /// as absent rather than reused.
    #[must_use]
    pub fn from_persisted(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GuestSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GuestSessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_format() {
        let id = GuestSessionId::generate();
        let suffix = id.as_str().strip_prefix(GuestSessionId::PREFIX);
        assert!(suffix.is_some_and(|s| Uuid::parse_str(s).is_ok()));
    }

    #[test]
    fn test_generate_is_unique() {
        assert_ne!(GuestSessionId::generate(), GuestSessionId::generate());
    }

    #[test]
    fn test_from_persisted_rejects_blank() {
        assert!(GuestSessionId::from_persisted("   ").is_none());
        assert_eq!(
            GuestSessionId::from_persisted("session_abc")
                .as_ref()
                .map(GuestSessionId::as_str),
            Some("session_abc")
        );
    }
}
