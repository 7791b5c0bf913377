//! Pure state transitions for the cart and wishlist mirror.
//!
//! The reducer never computes cart contents. A successful fetch or mutation
//! stores the server's snapshot verbatim; a failure keeps the previous
//! snapshot and records the error.

use crate::api::{Cart, Wishlist};

/// Load status of one server-owned resource.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    /// Nothing requested yet.
    Idle,
    /// A request is in flight.
    Loading {
        /// Last good snapshot, shown while loading.
        previous: Option<T>,
    },
    /// The last request succeeded.
    Ready(T),
    /// The last request failed.
    Failed {
        /// Last good snapshot, left in place for display.
        previous: Option<T>,
        /// Human-readable failure message.
        error: String,
    },
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> LoadState<T> {
    /// The last known-good snapshot, in any state.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&T> {
        match self {
            Self::Idle => None,
            Self::Ready(value) => Some(value),
            Self::Loading { previous } | Self::Failed { previous, .. } => previous.as_ref(),
        }
    }

    /// Whether a request is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// The failure message, if the last request failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    fn into_snapshot(self) -> Option<T> {
        match self {
            Self::Idle => None,
            Self::Ready(value) => Some(value),
            Self::Loading { previous } | Self::Failed { previous, .. } => previous,
        }
    }
}

/// Lifecycle event for one resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceAction<T> {
    /// A fetch or mutation was issued.
    Started,
    /// The server confirmed with a new snapshot.
    Succeeded(T),
    /// The request failed.
    Failed(String),
    /// Forget everything (logout).
    Reset,
}

/// Cart lifecycle event.
pub type CartAction = ResourceAction<Cart>;

/// Wishlist lifecycle event.
pub type WishlistAction = ResourceAction<Wishlist>;

/// Apply `action` to a single resource.
pub fn reduce_resource<T>(state: &mut LoadState<T>, action: ResourceAction<T>) {
    let current = std::mem::take(state);
    *state = match action {
        ResourceAction::Started => LoadState::Loading {
            previous: current.into_snapshot(),
        },
        ResourceAction::Succeeded(value) => LoadState::Ready(value),
        ResourceAction::Failed(error) => LoadState::Failed {
            previous: current.into_snapshot(),
            error,
        },
        ResourceAction::Reset => LoadState::Idle,
    };
}

// =============================================================================
// Store State
// =============================================================================

/// Which identity the cart and wishlist are keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Identity {
    /// Anonymous visitor; the cart is keyed by the guest session id.
    #[default]
    Guest,
    /// Signed in; the cart is keyed by the bearer token.
    Authenticated {
        /// Whether the login pivot (guest cart merge) has run.
        merged: bool,
    },
}

impl Identity {
    /// Whether the visitor is signed in.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// Process-wide storefront state.
///
/// Consumers hold read-only copies; only the store changes it, through
/// [`reduce`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub(crate) identity: Identity,
    pub(crate) cart: LoadState<Cart>,
    pub(crate) wishlist: LoadState<Wishlist>,
}

impl StoreSnapshot {
    /// The current identity.
    #[must_use]
    pub const fn identity(&self) -> Identity {
        self.identity
    }

    /// Cart load state.
    #[must_use]
    pub const fn cart_state(&self) -> &LoadState<Cart> {
        &self.cart
    }

    /// Wishlist load state.
    #[must_use]
    pub const fn wishlist_state(&self) -> &LoadState<Wishlist> {
        &self.wishlist
    }

    /// Last known cart.
    #[must_use]
    pub const fn cart(&self) -> Option<&Cart> {
        self.cart.snapshot()
    }

    /// Last known wishlist.
    #[must_use]
    pub const fn wishlist(&self) -> Option<&Wishlist> {
        self.wishlist.snapshot()
    }

    /// Units in the cart, zero before the first load.
    #[must_use]
    pub fn cart_count(&self) -> u32 {
        self.cart().map_or(0, Cart::item_count)
    }

    /// Products on the wishlist, zero before the first load.
    #[must_use]
    pub fn wishlist_count(&self) -> u32 {
        self.wishlist().map_or(0, Wishlist::count)
    }
}

/// Every state change the store can make.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    Cart(CartAction),
    Wishlist(WishlistAction),
    /// Credential became authenticated; the pivot has not run yet.
    SignedIn,
    /// The pivot ran (merge attempted or nothing to merge).
    Pivoted,
    /// Credential restored at startup; nothing to merge.
    Restored,
    /// Logout: back to an empty guest state.
    Reset,
}

/// Apply `action` to the store state.
pub fn reduce(state: &mut StoreSnapshot, action: StoreAction) {
    match action {
        StoreAction::Cart(action) => reduce_resource(&mut state.cart, action),
        StoreAction::Wishlist(action) => reduce_resource(&mut state.wishlist, action),
        StoreAction::SignedIn => {
            state.identity = Identity::Authenticated { merged: false };
        }
        StoreAction::Pivoted | StoreAction::Restored => {
            state.identity = Identity::Authenticated { merged: true };
        }
        StoreAction::Reset => {
            *state = StoreSnapshot::default();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use petal_core::CartId;

    use super::*;

    fn cart(id: &str) -> Cart {
        serde_json::from_value(serde_json::json!({ "_id": id, "items": [] })).unwrap()
    }

    #[test]
    fn test_success_replaces_snapshot_verbatim() {
        let mut state = LoadState::Idle;
        reduce_resource(&mut state, ResourceAction::Started);
        assert!(state.is_loading());
        assert!(state.snapshot().is_none());

        reduce_resource(&mut state, ResourceAction::Succeeded(cart("c1")));
        assert_eq!(state, LoadState::Ready(cart("c1")));
    }

    #[test]
    fn test_failure_keeps_previous_snapshot() {
        let mut state = LoadState::Ready(cart("c1"));
        reduce_resource(&mut state, ResourceAction::Started);
        assert_eq!(state.snapshot().map(|c| &c.id), Some(&CartId::new("c1")));

        reduce_resource(&mut state, ResourceAction::Failed("boom".to_string()));
        assert_eq!(state.error(), Some("boom"));
        assert_eq!(state.snapshot().map(|c| &c.id), Some(&CartId::new("c1")));

        // Retry keeps the snapshot while loading again.
        reduce_resource(&mut state, ResourceAction::Started);
        assert_eq!(state.snapshot().map(|c| &c.id), Some(&CartId::new("c1")));
    }

    #[test]
    fn test_latest_resolved_response_wins() {
        let mut state = LoadState::Ready(cart("c1"));
        reduce_resource(&mut state, ResourceAction::Started);
        reduce_resource(&mut state, ResourceAction::Started);
        reduce_resource(&mut state, ResourceAction::Succeeded(cart("c2")));
        reduce_resource(&mut state, ResourceAction::Succeeded(cart("c3")));
        assert_eq!(state, LoadState::Ready(cart("c3")));
    }

    #[test]
    fn test_identity_transitions() {
        let mut state = StoreSnapshot::default();
        assert_eq!(state.identity(), Identity::Guest);

        reduce(&mut state, StoreAction::SignedIn);
        assert_eq!(state.identity(), Identity::Authenticated { merged: false });

        reduce(&mut state, StoreAction::Pivoted);
        assert_eq!(state.identity(), Identity::Authenticated { merged: true });
    }

    #[test]
    fn test_reset_zeroes_counts() {
        let mut state = StoreSnapshot::default();
        let populated: Cart = serde_json::from_value(serde_json::json!({
            "_id": "c1",
            "items": [{
                "_id": "i1",
                "product": { "_id": "p1", "name": "Rose Bouquet", "price": "399" },
                "quantity": 2
            }]
        }))
        .unwrap();

        reduce(&mut state, StoreAction::Restored);
        reduce(&mut state, StoreAction::Cart(ResourceAction::Succeeded(populated)));
        assert_eq!(state.cart_count(), 2);

        reduce(&mut state, StoreAction::Reset);
        assert_eq!(state.cart_count(), 0);
        assert_eq!(state.wishlist_count(), 0);
        assert_eq!(state.identity(), Identity::Guest);
        assert_eq!(state.cart_state(), &LoadState::Idle);
    }
}
