//! Session-related types.
//!
//! Types persisted between runs to identify the visitor.

use core::fmt;

use secrecy::{ExposeSecret, SecretString};

/// The bearer credential attached to outgoing requests.
///
/// Anonymous visitors carry no token. The value is published through a
/// `tokio::sync::watch` channel so the API client always reads the current
/// token without holding a lock.
#[derive(Clone, Default)]
pub struct Credential {
    access_token: Option<SecretString>,
}

impl Credential {
    /// A credential with no access token.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A credential carrying `token`.
    #[must_use]
    pub fn authenticated(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(SecretString::from(token.into())),
        }
    }

    /// Restore a persisted token, treating blank values as absent.
    #[must_use]
    pub fn from_persisted(token: Option<String>) -> Self {
        token
            .filter(|t| !t.trim().is_empty())
            .map_or_else(Self::anonymous, Self::authenticated)
    }

    /// The access token, if any.
    #[must_use]
    pub const fn access_token(&self) -> Option<&SecretString> {
        self.access_token.as_ref()
    }

    /// Whether the visitor is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        match (&self.access_token, &other.access_token) {
            (Some(a), Some(b)) => a.expose_secret() == b.expose_secret(),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

/// Keys for persisted client state.
pub mod keys {
    /// Key for the guest cart session identifier.
    pub const GUEST_SESSION_ID: &str = "guest_session_id";

    /// Key for the bearer access token.
    pub const ACCESS_TOKEN: &str = "access_token";
}
