//! Guest session identity.
//!
//! Issues the `session_<uuid>` id that keys an anonymous visitor's cart. The
//! id is persisted so it survives restarts, and removed only at logout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use petal_core::GuestSessionId;
use tracing::{info, warn};

use crate::models::keys;
use crate::storage::{StateStore, StorageError};

/// Provider of the persisted guest session id.
///
/// If the backing store fails, the provider keeps serving an in-memory id for
/// the rest of the process instead of failing the caller.
pub struct GuestIdentity {
    store: Arc<dyn StateStore>,
    /// Guards create-if-absent and holds the id while degraded.
    fallback: Mutex<Option<GuestSessionId>>,
    degraded: AtomicBool,
}

impl GuestIdentity {
    /// Create a provider backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self {
            store,
            fallback: Mutex::new(None),
            degraded: AtomicBool::new(false),
        }
    }

    /// Return the persisted guest id, creating and persisting one if absent.
    ///
    /// Never regenerates while a persisted value exists.
    pub fn get_or_create(&self) -> GuestSessionId {
        let mut fallback = self.fallback.lock().unwrap_or_else(PoisonError::into_inner);

        if self.is_degraded() {
            return fallback.get_or_insert_with(GuestSessionId::generate).clone();
        }

        match self.read() {
            Ok(Some(id)) => return id,
            Ok(None) => {}
            Err(e) => {
                self.degrade(&e);
                return fallback.get_or_insert_with(GuestSessionId::generate).clone();
            }
        }

        let id = GuestSessionId::generate();
        if let Err(e) = self.store.set(keys::GUEST_SESSION_ID, id.as_str()) {
            self.degrade(&e);
            *fallback = Some(id.clone());
        } else {
            info!(session_id = %id, "Created guest session");
        }
        id
    }

    /// The current guest id without creating one.
    pub fn current(&self) -> Option<GuestSessionId> {
        let fallback = self.fallback.lock().unwrap_or_else(PoisonError::into_inner);

        if self.is_degraded() {
            return fallback.clone();
        }

        self.read().unwrap_or_else(|e| {
            self.degrade(&e);
            fallback.clone()
        })
    }

    /// Remove the guest id. The next [`get_or_create`](Self::get_or_create)
    /// issues a fresh one.
    pub fn clear(&self) {
        let mut fallback = self.fallback.lock().unwrap_or_else(PoisonError::into_inner);
        *fallback = None;

        if self.is_degraded() {
            return;
        }

        if let Err(e) = self.store.remove(keys::GUEST_SESSION_ID) {
            self.degrade(&e);
        } else {
            info!("Cleared guest session");
        }
    }

    /// Whether the provider has fallen back to in-memory storage.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Acquire)
    }

    fn read(&self) -> Result<Option<GuestSessionId>, StorageError> {
        Ok(self
            .store
            .get(keys::GUEST_SESSION_ID)?
            .as_deref()
            .and_then(GuestSessionId::from_persisted))
    }

    fn degrade(&self, error: &StorageError) {
        if !self.degraded.swap(true, Ordering::AcqRel) {
            warn!(
                error = %error,
                "Guest session storage unavailable, using in-memory id for this process"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::storage::MemoryStateStore;

    /// A store whose every operation fails.
    pub(crate) struct BrokenStore;

    impl StateStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Poisoned)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let identity = GuestIdentity::new(Arc::new(MemoryStateStore::new()));
        let first = identity.get_or_create();
        assert_eq!(identity.get_or_create(), first);
        assert!(first.as_str().starts_with(GuestSessionId::PREFIX));
    }

    #[test]
    fn test_reuses_persisted_id() {
        let store = Arc::new(MemoryStateStore::new());
        store.set(keys::GUEST_SESSION_ID, "session_existing").unwrap();

        let identity = GuestIdentity::new(store);
        assert_eq!(identity.get_or_create().as_str(), "session_existing");
    }

    #[test]
    fn test_clear_then_create_issues_new_id() {
        let store = Arc::new(MemoryStateStore::new());
        let identity = GuestIdentity::new(store.clone());

        let first = identity.get_or_create();
        identity.clear();
        assert!(identity.current().is_none());
        assert_eq!(store.get(keys::GUEST_SESSION_ID).unwrap(), None);

        assert_ne!(identity.get_or_create(), first);
    }

    #[test]
    fn test_degraded_mode_keeps_stable_id() {
        let identity = GuestIdentity::new(Arc::new(BrokenStore));

        let first = identity.get_or_create();
        assert!(identity.is_degraded());
        assert_eq!(identity.get_or_create(), first);
        assert_eq!(identity.current(), Some(first.clone()));

        identity.clear();
        assert!(identity.current().is_none());
        assert_ne!(identity.get_or_create(), first);
    }
}
