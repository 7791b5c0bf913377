//! Process-wide cart and wishlist store.
//!
//! Views read [`StoreSnapshot`]s from a `watch` channel and change state only
//! by dispatching intents. Each intent becomes one or more backend requests;
//! the confirmed responses are fed through the [`reducer`].
//!
//! # Ordering
//!
//! Cart mutations run one at a time under an async mutex, so rapid repeated
//! intents resolve in issue order. Wishlist mutations have their own mutex.
//! A moving item takes the cart lock first, then the wishlist lock.
//!
//! # Identity
//!
//! Reads and writes go to the guest cart until the credential becomes
//! authenticated. [`Store::on_login`] then folds the guest cart into the user
//! cart exactly once; a later login without a logout skips the merge.
//! [`Store::reset`] returns to an empty guest state and bumps an epoch so
//! responses from before the reset are dropped.

pub mod reducer;
pub mod scope;

pub use reducer::{
    CartAction, Identity, LoadState, ResourceAction, StoreAction, StoreSnapshot, WishlistAction,
    reduce, reduce_resource,
};
pub use scope::{ScopeToken, ViewScope};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use petal_core::{CartItemId, ProductId, Quantity, QuantityError};
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument, warn};

use crate::api::{
    AddToCartInput, ApiClient, ApiError, Cart, CartOwner, CacheTag, DiscountCode,
    MoveToCartInput, Wishlist,
};
use crate::error::add_breadcrumb;
use crate::services::{CredentialStore, GuestIdentity};

/// Errors from store intents.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The intent needs a signed-in user.
    #[error("sign in required")]
    SignInRequired,

    /// The requested quantity cannot be sent.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    /// The intent names a cart line that is not in the current cart.
    #[error("cart item not found: {0}")]
    ItemNotFound(CartItemId),
}

/// Cart intents a view may dispatch.
#[derive(Debug, Clone)]
pub enum CartIntent {
    /// Fetch the current cart.
    Load,
    /// Add a product.
    Add(AddToCartInput),
    /// Set a line's quantity. Zero or less removes the line.
    SetQuantity { item_id: CartItemId, quantity: i64 },
    /// Change a line's quantity by `delta`. Dropping below one removes the line.
    Adjust { item_id: CartItemId, delta: i64 },
    /// Remove a line.
    Remove(CartItemId),
    /// Remove every line.
    Clear,
    /// Apply a coupon or voucher.
    ApplyDiscount(DiscountCode),
    /// Remove any applied discount.
    RemoveDiscount,
}

/// Wishlist intents a view may dispatch.
#[derive(Debug, Clone)]
pub enum WishlistIntent {
    Load,
    Add(ProductId),
    Remove(ProductId),
    Toggle(ProductId),
    /// Move a product to the cart in one request.
    MoveToCart(MoveToCartInput),
    Clear,
}

/// A cart intent resolved against the current snapshot.
#[derive(Debug)]
enum CartRequest {
    Details,
    Add(AddToCartInput),
    Update(CartItemId, Quantity),
    Remove(CartItemId),
    Clear,
    ApplyDiscount(DiscountCode),
    RemoveDiscount,
}

impl CartRequest {
    const fn label(&self) -> &'static str {
        match self {
            Self::Details => "Loaded cart",
            Self::Add(_) => "Added to cart",
            Self::Update(..) => "Updated cart quantity",
            Self::Remove(_) => "Removed from cart",
            Self::Clear => "Cleared cart",
            Self::ApplyDiscount(_) => "Applied discount",
            Self::RemoveDiscount => "Removed discount",
        }
    }
}

/// A wishlist intent that maps to a single wishlist request.
#[derive(Debug)]
enum WishlistRequest {
    Load,
    Add(ProductId),
    Remove(ProductId),
    Toggle(ProductId),
    Clear,
}

impl WishlistRequest {
    const fn label(&self) -> &'static str {
        match self {
            Self::Load => "Loaded wishlist",
            Self::Add(_) => "Added to wishlist",
            Self::Remove(_) => "Removed from wishlist",
            Self::Toggle(_) => "Toggled wishlist item",
            Self::Clear => "Cleared wishlist",
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Shared cart and wishlist state.
pub struct Store {
    api: ApiClient,
    credentials: Arc<CredentialStore>,
    guest: Arc<GuestIdentity>,
    state: watch::Sender<StoreSnapshot>,
    epoch: AtomicU64,
    cart_lock: Mutex<()>,
    wishlist_lock: Mutex<()>,
    pivot_lock: Mutex<()>,
}

impl Store {
    /// Create a store. A credential restored from storage counts as already
    /// pivoted, so no merge runs for it.
    #[must_use]
    pub fn new(
        api: ApiClient,
        credentials: Arc<CredentialStore>,
        guest: Arc<GuestIdentity>,
    ) -> Self {
        let mut initial = StoreSnapshot::default();
        if credentials.is_authenticated() {
            reduce(&mut initial, StoreAction::Restored);
        }

        let (state, _) = watch::channel(initial);
        Self {
            api,
            credentials,
            guest,
            state,
            epoch: AtomicU64::new(0),
            cart_lock: Mutex::new(()),
            wishlist_lock: Mutex::new(()),
            pivot_lock: Mutex::new(()),
        }
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.state.subscribe()
    }

    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.borrow().clone()
    }

    /// The cart the next request targets.
    ///
    /// Creates the guest id lazily for anonymous visitors.
    #[must_use]
    pub fn owner(&self) -> CartOwner {
        if self.credentials.is_authenticated() {
            CartOwner::User
        } else {
            CartOwner::Guest(self.guest.get_or_create())
        }
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Apply `action` unless a reset happened since `epoch` was read.
    fn commit(&self, epoch: u64, action: StoreAction) -> bool {
        self.state.send_if_modified(|state| {
            if self.epoch.load(Ordering::Acquire) != epoch {
                debug!("Discarding result from before reset");
                return false;
            }
            reduce(state, action);
            true
        })
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Dispatch a cart intent and wait for the server's answer.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Api` if the request fails (the previous snapshot
    /// is kept and marked failed), `StoreError::SignInRequired` for discount
    /// intents on a guest cart, and `StoreError::ItemNotFound` or
    /// `StoreError::InvalidQuantity` for intents rejected before any request.
    #[instrument(skip(self))]
    pub async fn dispatch_cart(&self, intent: CartIntent) -> Result<Cart, StoreError> {
        let _guard = self.cart_lock.lock().await;
        let owner = self.owner();
        let epoch = self.current_epoch();
        let request = self.resolve_cart_intent(intent, &owner)?;
        let label = request.label();

        self.commit(epoch, StoreAction::Cart(CartAction::Started));
        match self.run_cart_request(request, &owner).await {
            Ok(cart) => {
                self.commit(epoch, StoreAction::Cart(CartAction::Succeeded(cart.clone())));
                add_breadcrumb("cart", label, Some(&[("cart_id", cart.id.as_str())]));
                Ok(cart)
            }
            Err(e) => {
                warn!(error = %e, action = label, "Cart request failed");
                self.commit(epoch, StoreAction::Cart(CartAction::Failed(e.to_string())));
                Err(e.into())
            }
        }
    }

    fn resolve_cart_intent(
        &self,
        intent: CartIntent,
        owner: &CartOwner,
    ) -> Result<CartRequest, StoreError> {
        let request = match intent {
            CartIntent::Load => CartRequest::Details,
            CartIntent::Add(input) => CartRequest::Add(input),
            CartIntent::SetQuantity { item_id, quantity } => quantity_request(item_id, quantity)?,
            CartIntent::Adjust { item_id, delta } => {
                let current = self
                    .state
                    .borrow()
                    .cart()
                    .and_then(|cart| cart.item(&item_id))
                    .map(|item| i64::from(item.quantity.get()));
                let Some(current) = current else {
                    return Err(StoreError::ItemNotFound(item_id));
                };
                quantity_request(item_id, current.saturating_add(delta))?
            }
            CartIntent::Remove(item_id) => CartRequest::Remove(item_id),
            CartIntent::Clear => CartRequest::Clear,
            CartIntent::ApplyDiscount(_) | CartIntent::RemoveDiscount if owner.is_guest() => {
                return Err(StoreError::SignInRequired);
            }
            CartIntent::ApplyDiscount(code) => CartRequest::ApplyDiscount(code),
            CartIntent::RemoveDiscount => CartRequest::RemoveDiscount,
        };
        Ok(request)
    }

    async fn run_cart_request(
        &self,
        request: CartRequest,
        owner: &CartOwner,
    ) -> Result<Cart, ApiError> {
        match request {
            CartRequest::Details => self.api.cart_details(owner).await,
            CartRequest::Add(input) => self.api.add_to_cart(owner, &input).await,
            CartRequest::Update(item_id, quantity) => {
                self.api.update_cart_item(owner, &item_id, quantity).await
            }
            CartRequest::Remove(item_id) => self.api.remove_cart_item(owner, &item_id).await,
            CartRequest::Clear => match owner {
                CartOwner::User => self.api.clear_cart().await,
                CartOwner::Guest(_) => {
                    // Guest carts have no clear endpoint.
                    let mut cart = self.api.cart_details(owner).await?;
                    let item_ids: Vec<CartItemId> =
                        cart.items.iter().map(|item| item.id.clone()).collect();
                    for item_id in item_ids {
                        cart = self.api.remove_cart_item(owner, &item_id).await?;
                    }
                    Ok(cart)
                }
            },
            CartRequest::ApplyDiscount(code) => self.api.apply_discount(&code).await,
            CartRequest::RemoveDiscount => self.api.remove_discount().await,
        }
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Dispatch a wishlist intent and wait for the server's answer.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SignInRequired` for anonymous visitors, or
    /// `StoreError::Api` if the request fails.
    #[instrument(skip(self))]
    pub async fn dispatch_wishlist(&self, intent: WishlistIntent) -> Result<Wishlist, StoreError> {
        if !self.credentials.is_authenticated() {
            return Err(StoreError::SignInRequired);
        }

        let request = match intent {
            WishlistIntent::MoveToCart(input) => return self.move_to_cart(&input).await,
            WishlistIntent::Load => WishlistRequest::Load,
            WishlistIntent::Add(product_id) => WishlistRequest::Add(product_id),
            WishlistIntent::Remove(product_id) => WishlistRequest::Remove(product_id),
            WishlistIntent::Toggle(product_id) => WishlistRequest::Toggle(product_id),
            WishlistIntent::Clear => WishlistRequest::Clear,
        };
        let label = request.label();

        let _guard = self.wishlist_lock.lock().await;
        let epoch = self.current_epoch();

        self.commit(epoch, StoreAction::Wishlist(WishlistAction::Started));
        let result = match request {
            WishlistRequest::Load => self.load_wishlist().await,
            WishlistRequest::Add(product_id) => self.api.add_to_wishlist(&product_id).await,
            WishlistRequest::Remove(product_id) => {
                self.api.remove_from_wishlist(&product_id).await
            }
            WishlistRequest::Toggle(product_id) => self
                .api
                .toggle_wishlist(&product_id)
                .await
                .map(|outcome| outcome.wishlist),
            WishlistRequest::Clear => self.api.clear_wishlist().await,
        };

        match result {
            Ok(wishlist) => {
                self.commit(
                    epoch,
                    StoreAction::Wishlist(WishlistAction::Succeeded(wishlist.clone())),
                );
                add_breadcrumb("wishlist", label, None);
                Ok(wishlist)
            }
            Err(e) => {
                warn!(error = %e, action = label, "Wishlist request failed");
                self.commit(
                    epoch,
                    StoreAction::Wishlist(WishlistAction::Failed(e.to_string())),
                );
                Err(e.into())
            }
        }
    }

    /// Read the wishlist, creating it on first use.
    async fn load_wishlist(&self) -> Result<Wishlist, ApiError> {
        match self.api.wishlist().await {
            Err(e) if e.status() == Some(404) => self.api.create_wishlist().await,
            other => other,
        }
    }

    async fn move_to_cart(&self, input: &MoveToCartInput) -> Result<Wishlist, StoreError> {
        let _cart = self.cart_lock.lock().await;
        let _wishlist = self.wishlist_lock.lock().await;
        let epoch = self.current_epoch();

        self.commit(epoch, StoreAction::Cart(CartAction::Started));
        self.commit(epoch, StoreAction::Wishlist(WishlistAction::Started));

        match self.api.move_to_cart(input).await {
            Ok(outcome) => {
                self.commit(epoch, StoreAction::Cart(CartAction::Succeeded(outcome.cart)));
                self.commit(
                    epoch,
                    StoreAction::Wishlist(WishlistAction::Succeeded(outcome.wishlist.clone())),
                );
                add_breadcrumb(
                    "wishlist",
                    "Moved to cart",
                    Some(&[("product_id", input.product_id.as_str())]),
                );
                Ok(outcome.wishlist)
            }
            Err(e) => {
                warn!(error = %e, "Move to cart failed");
                let message = e.to_string();
                self.commit(epoch, StoreAction::Cart(CartAction::Failed(message.clone())));
                self.commit(epoch, StoreAction::Wishlist(WishlistAction::Failed(message)));
                Err(e.into())
            }
        }
    }

    // =========================================================================
    // Identity Transitions
    // =========================================================================

    /// Pivot from the guest cart to the user cart after a login.
    ///
    /// Sends the guest session id to the merge endpoint once per login. A
    /// conflict (already merged) is ignored. Other merge failures are logged
    /// and recorded on the cart state; the merge is not retried.
    #[instrument(skip(self))]
    pub async fn on_login(&self) {
        let _pivot = self.pivot_lock.lock().await;

        if !self.credentials.is_authenticated() {
            debug!("No credential, skipping guest cart merge");
            return;
        }
        if self.state.borrow().identity().is_authenticated() {
            debug!("Already signed in, skipping guest cart merge");
            return;
        }

        let epoch = self.current_epoch();
        self.commit(epoch, StoreAction::SignedIn);

        if let Some(session_id) = self.guest.current() {
            let _cart = self.cart_lock.lock().await;
            self.commit(epoch, StoreAction::Cart(CartAction::Started));

            match self.api.merge_guest_cart(&session_id).await {
                Ok(cart) => {
                    info!(session_id = %session_id, items = cart.items.len(), "Merged guest cart");
                    self.commit(epoch, StoreAction::Cart(CartAction::Succeeded(cart)));
                }
                Err(e) if e.is_conflict() => {
                    info!(session_id = %session_id, "Guest cart already merged");
                    self.api
                        .invalidate(&[CacheTag::Cart(CartOwner::Guest(session_id))])
                        .await;
                    self.commit(epoch, StoreAction::Cart(CartAction::Reset));
                }
                Err(e) => {
                    warn!(error = %e, session_id = %session_id, "Guest cart merge failed");
                    self.commit(epoch, StoreAction::Cart(CartAction::Failed(e.to_string())));
                }
            }
        } else {
            self.commit(epoch, StoreAction::Cart(CartAction::Reset));
        }

        self.commit(epoch, StoreAction::Pivoted);
    }

    /// Return to an empty guest state.
    ///
    /// Responses to requests issued before the reset are discarded.
    pub fn reset(&self) {
        self.state.send_modify(|state| {
            self.epoch.fetch_add(1, Ordering::AcqRel);
            reduce(state, StoreAction::Reset);
        });
        info!("Store reset to guest state");
    }

    /// Reset to an empty guest state and drop the guest id.
    ///
    /// Holds the cart lock throughout, so a queued cart intent runs only
    /// after the old guest id is gone and targets a fresh guest cart.
    pub async fn reset_and_clear_guest(&self) {
        let _cart = self.cart_lock.lock().await;
        self.reset();
        self.guest.clear();
    }

    /// Reload the cart, and the wishlist when signed in.
    ///
    /// # Errors
    ///
    /// Returns the first failure; both loads are attempted regardless.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        if self.credentials.is_authenticated() {
            let (cart, wishlist) = tokio::join!(
                self.dispatch_cart(CartIntent::Load),
                self.dispatch_wishlist(WishlistIntent::Load)
            );
            cart?;
            wishlist?;
        } else {
            self.dispatch_cart(CartIntent::Load).await?;
        }
        Ok(())
    }
}

/// Turn a requested quantity into an update, or a removal when it is not positive.
fn quantity_request(item_id: CartItemId, quantity: i64) -> Result<CartRequest, StoreError> {
    if quantity <= 0 {
        return Ok(CartRequest::Remove(item_id));
    }
    Ok(CartRequest::Update(item_id, Quantity::new(quantity)?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_non_positive_quantity_becomes_remove() {
        let id = CartItemId::new("i1");
        assert!(matches!(
            quantity_request(id.clone(), 0).unwrap(),
            CartRequest::Remove(ref removed) if removed == &id
        ));
        assert!(matches!(
            quantity_request(id.clone(), -4).unwrap(),
            CartRequest::Remove(_)
        ));
        assert!(matches!(
            quantity_request(id, 3).unwrap(),
            CartRequest::Update(_, q) if q.get() == 3
        ));
    }

    #[test]
    fn test_oversized_quantity_is_rejected() {
        assert!(matches!(
            quantity_request(CartItemId::new("i1"), i64::MAX),
            Err(StoreError::InvalidQuantity(QuantityError::TooLarge(_)))
        ));
    }
}
