//! Authentication service.
//!
//! Owns the bearer credential. Login and signup go through the REST backend;
//! the resulting token is persisted and published on a `watch` channel that
//! the API client reads from. Only this module ever changes the credential.

mod error;
mod validation;

pub use error::{AuthError, FieldErrors};
pub use validation::{MIN_PASSWORD_LENGTH, SignupForm};

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, AuthResponse, LoginRequest, Profile, SignupRequest};
use crate::models::{Credential, keys};
use crate::storage::StateStore;

/// Credential store.
///
/// Handles login, signup and credential teardown at logout.
pub struct CredentialStore {
    storage: Arc<dyn StateStore>,
    sender: watch::Sender<Credential>,
}

impl CredentialStore {
    /// Create a store, restoring any persisted access token.
    ///
    /// Unreadable storage starts the session anonymous.
    #[must_use]
    pub fn restore(storage: Arc<dyn StateStore>) -> Self {
        let persisted = storage.get(keys::ACCESS_TOKEN).unwrap_or_else(|e| {
            warn!(error = %e, "Could not read persisted access token");
            None
        });
        let credential = Credential::from_persisted(persisted);
        if credential.is_authenticated() {
            info!("Restored persisted credential");
        }

        let (sender, _) = watch::channel(credential);
        Self { storage, sender }
    }

    /// Subscribe to credential changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Credential> {
        self.sender.subscribe()
    }

    /// The current credential.
    #[must_use]
    pub fn current(&self) -> Credential {
        self.sender.borrow().clone()
    }

    /// Whether a token is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.sender.borrow().is_authenticated()
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Login with email and password.
    ///
    /// On failure the previous credential is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for blank fields (no request is sent),
    /// `AuthError::InvalidCredentials` if the backend rejects the pair, and
    /// `AuthError::Network`/`AuthError::Server` otherwise.
    #[instrument(skip(self, api, password))]
    pub async fn login(
        &self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<Profile, AuthError> {
        validation::validate_login(email, password)?;

        let response = api
            .login(&LoginRequest {
                email: email.trim(),
                password,
            })
            .await
            .map_err(AuthError::from_login)?;

        Ok(self.establish(response))
    }

    /// Register a new account and sign it in.
    ///
    /// Every field is validated locally first; an invalid form never reaches
    /// the network.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with one message per failing field, or
    /// `AuthError::Network`/`AuthError::Server` if the request fails.
    #[instrument(skip(self, api, form), fields(email = %form.email))]
    pub async fn signup(&self, api: &ApiClient, form: &SignupForm) -> Result<Profile, AuthError> {
        let valid = form.validate()?;

        let response = api
            .signup(&SignupRequest {
                first_name: valid.first_name,
                last_name: valid.last_name,
                email: valid.email.as_str(),
                phone: valid.phone.as_str(),
                password: valid.password,
            })
            .await?;

        Ok(self.establish(response))
    }

    /// Drop the credential from storage and memory.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(keys::ACCESS_TOKEN) {
            warn!(error = %e, "Could not remove persisted access token");
        }
        self.sender.send_replace(Credential::anonymous());
        info!("Credential cleared");
    }

    fn establish(&self, response: AuthResponse) -> Profile {
        let AuthResponse { access_token, user } = response;

        if let Err(e) = self.storage.set(keys::ACCESS_TOKEN, &access_token) {
            warn!(error = %e, "Could not persist access token, session will not survive restart");
        }
        self.sender
            .send_replace(Credential::authenticated(access_token));

        crate::error::set_sentry_user(&user.id, Some(&user.email));
        info!(user_id = %user.id, "Signed in");
        user
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStateStore;

    #[test]
    fn test_restore_reads_persisted_token() {
        let storage = Arc::new(MemoryStateStore::new());
        storage.set(keys::ACCESS_TOKEN, "jwt").unwrap();

        let store = CredentialStore::restore(storage);
        assert!(store.is_authenticated());
    }

    #[test]
    fn test_clear_publishes_anonymous() {
        let storage = Arc::new(MemoryStateStore::new());
        storage.set(keys::ACCESS_TOKEN, "jwt").unwrap();
        let store = CredentialStore::restore(storage.clone());
        let rx = store.subscribe();

        store.clear();

        assert!(!rx.borrow().is_authenticated());
        assert_eq!(storage.get(keys::ACCESS_TOKEN).unwrap(), None);
    }
}
