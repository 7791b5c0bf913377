//! Storefront facade shared across views.

use std::sync::Arc;

use petal_core::{CartItemId, PaymentMethod, ProductId};
use tracing::{info, instrument};

use crate::api::{
    AddToCartInput, ApiClient, CacheTag, Cart, CartOwner, CartValidation, DiscountCode,
    MoveToCartInput, Profile, ProductColor, Wishlist,
};
use crate::checkout::{CartPage, CheckoutSession, Order};
use crate::config::StorefrontConfig;
use crate::error::{Result, clear_sentry_user};
use crate::services::{CredentialStore, GuestIdentity, SignupForm};
use crate::storage::{FileStateStore, StateStore};
use crate::store::{CartIntent, Store, StoreError, StoreSnapshot, WishlistIntent};

/// Storefront state shared across all views.
///
/// This struct is cheaply cloneable via `Arc` and owns the API client, the
/// credential store, the guest identity and the cart/wishlist store.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    api: ApiClient,
    credentials: Arc<CredentialStore>,
    guest: Arc<GuestIdentity>,
    store: Store,
}

impl Storefront {
    /// Create a storefront persisting state under `config.state_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: StorefrontConfig) -> Result<Self> {
        let storage = Arc::new(FileStateStore::new(config.state_file()));
        Self::with_state_store(config, storage)
    }

    /// Create a storefront with custom state storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_state_store(
        config: StorefrontConfig,
        storage: Arc<dyn StateStore>,
    ) -> Result<Self> {
        let credentials = Arc::new(CredentialStore::restore(Arc::clone(&storage)));
        let guest = Arc::new(GuestIdentity::new(storage));
        let api = ApiClient::new(&config.api, credentials.subscribe())?;
        let store = Store::new(api.clone(), Arc::clone(&credentials), Arc::clone(&guest));

        info!(
            base_url = %config.api.base_url,
            authenticated = credentials.is_authenticated(),
            "Storefront initialised"
        );

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                api,
                credentials,
                guest,
                store,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the REST API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the cart/wishlist store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Get a reference to the guest identity provider.
    #[must_use]
    pub fn guest(&self) -> &GuestIdentity {
        &self.inner.guest
    }

    /// Whether a user is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.credentials.is_authenticated()
    }

    /// Current cart and wishlist state.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        self.inner.store.snapshot()
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Sign in and fold the guest cart into the user cart.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Auth` if the login fails.
    pub async fn login(&self, email: &str, password: &str) -> Result<Profile> {
        let profile = self
            .inner
            .credentials
            .login(&self.inner.api, email, password)
            .await?;
        self.inner.store.on_login().await;
        Ok(profile)
    }

    /// Register, sign in and fold the guest cart into the new user cart.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Auth` if validation or the request fails.
    pub async fn signup(&self, form: &SignupForm) -> Result<Profile> {
        let profile = self
            .inner
            .credentials
            .signup(&self.inner.api, form)
            .await?;
        self.inner.store.on_login().await;
        Ok(profile)
    }

    /// Sign out.
    ///
    /// Clears the credential, resets cart and wishlist state to an empty
    /// guest state, then removes the guest id. The next cart access creates a
    /// fresh guest cart.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        self.inner.credentials.clear();
        self.inner.store.reset_and_clear_guest().await;
        self.inner
            .api
            .invalidate(&[
                CacheTag::Cart(CartOwner::User),
                CacheTag::Wishlist,
                CacheTag::Profile,
            ])
            .await;
        clear_sentry_user();
        info!("Signed out");
    }

    /// The signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SignInRequired` for guests, or an API error.
    pub async fn profile(&self) -> Result<Profile> {
        self.require_auth()?;
        Ok(self.inner.api.profile().await?)
    }

    fn require_auth(&self) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(StoreError::SignInRequired.into())
        }
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Load the current cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn load_cart(&self) -> Result<Cart> {
        self.cart(CartIntent::Load).await
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn add_to_cart(&self, input: AddToCartInput) -> Result<Cart> {
        self.cart(CartIntent::Add(input)).await
    }

    /// Set a line's quantity; zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn set_quantity(&self, item_id: CartItemId, quantity: i64) -> Result<Cart> {
        self.cart(CartIntent::SetQuantity { item_id, quantity })
            .await
    }

    /// Change a line's quantity by `delta`; dropping below one removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not in the loaded cart or the request fails.
    pub async fn adjust_quantity(&self, item_id: CartItemId, delta: i64) -> Result<Cart> {
        self.cart(CartIntent::Adjust { item_id, delta }).await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn remove_from_cart(&self, item_id: CartItemId) -> Result<Cart> {
        self.cart(CartIntent::Remove(item_id)).await
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Returns an error if a request fails.
    pub async fn clear_cart(&self) -> Result<Cart> {
        self.cart(CartIntent::Clear).await
    }

    /// Apply a coupon or voucher. Signed-in users only.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is rejected or the visitor is a guest.
    pub async fn apply_discount(&self, code: DiscountCode) -> Result<Cart> {
        self.cart(CartIntent::ApplyDiscount(code)).await
    }

    /// Remove any applied discount. Signed-in users only.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the visitor is a guest.
    pub async fn remove_discount(&self) -> Result<Cart> {
        self.cart(CartIntent::RemoveDiscount).await
    }

    /// Check stock and pricing before checkout. Signed-in users only.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the visitor is a guest.
    pub async fn validate_cart(&self) -> Result<CartValidation> {
        self.require_auth()?;
        Ok(self.inner.api.validate_cart().await?)
    }

    /// Cart view projection of the last known cart.
    #[must_use]
    pub fn cart_page(&self) -> CartPage {
        CartPage::from_snapshot(self.inner.store.snapshot().cart())
    }

    async fn cart(&self, intent: CartIntent) -> Result<Cart> {
        Ok(self.inner.store.dispatch_cart(intent).await?)
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Load the wishlist, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error for guests or if the request fails.
    pub async fn load_wishlist(&self) -> Result<Wishlist> {
        self.wishlist(WishlistIntent::Load).await
    }

    /// Save a product.
    ///
    /// # Errors
    ///
    /// Returns an error for guests or if the request fails.
    pub async fn add_to_wishlist(&self, product_id: ProductId) -> Result<Wishlist> {
        self.wishlist(WishlistIntent::Add(product_id)).await
    }

    /// Remove a saved product.
    ///
    /// # Errors
    ///
    /// Returns an error for guests or if the request fails.
    pub async fn remove_from_wishlist(&self, product_id: ProductId) -> Result<Wishlist> {
        self.wishlist(WishlistIntent::Remove(product_id)).await
    }

    /// Save the product if absent, remove it if present. Returns whether it
    /// is saved afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error for guests or if the request fails.
    pub async fn toggle_wishlist(&self, product_id: ProductId) -> Result<bool> {
        let wishlist = self
            .wishlist(WishlistIntent::Toggle(product_id.clone()))
            .await?;
        Ok(wishlist.contains(&product_id))
    }

    /// Move a saved product into the cart in one request.
    ///
    /// # Errors
    ///
    /// Returns an error for guests or if the request fails.
    pub async fn move_to_cart(&self, input: MoveToCartInput) -> Result<Wishlist> {
        self.wishlist(WishlistIntent::MoveToCart(input)).await
    }

    /// Remove every saved product.
    ///
    /// # Errors
    ///
    /// Returns an error for guests or if the request fails.
    pub async fn clear_wishlist(&self) -> Result<Wishlist> {
        self.wishlist(WishlistIntent::Clear).await
    }

    /// Number of saved products; zero for guests.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn wishlist_count(&self) -> Result<u32> {
        if !self.is_authenticated() {
            return Ok(0);
        }
        Ok(self.inner.api.wishlist_count().await?)
    }

    async fn wishlist(&self, intent: WishlistIntent) -> Result<Wishlist> {
        Ok(self.inner.store.dispatch_wishlist(intent).await?)
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Start a checkout of the whole cart, reloading it first.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` for an empty cart, or an error if
    /// the cart cannot be loaded.
    pub async fn checkout_from_cart(&self) -> Result<CheckoutSession> {
        let cart = self.load_cart().await?;
        Ok(CheckoutSession::from_cart(&cart)?)
    }

    /// Start a "buy now" checkout of one product.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidQuantity` for quantities below one, or
    /// an error if the product cannot be loaded.
    pub async fn buy_now(
        &self,
        product_id: &ProductId,
        quantity: i64,
        size: Option<String>,
        color: Option<ProductColor>,
    ) -> Result<CheckoutSession> {
        let product = self.inner.api.product(product_id).await?;
        Ok(CheckoutSession::buy_now(product, quantity, size, color)?)
    }

    /// Place the order, shipping to the profile address at `address_index`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SignInRequired` for guests,
    /// `CheckoutError::NoAddress` when the profile has no address, and
    /// `CheckoutError::AddressNotFound` for a bad index.
    #[instrument(skip(self, session))]
    pub async fn place_order(
        &self,
        session: &CheckoutSession,
        address_index: usize,
        payment_method: PaymentMethod,
    ) -> Result<Order> {
        let profile = self.profile().await?;
        let order = session.place(&profile.addresses, address_index, payment_method)?;
        info!(
            order_id = %order.order_id,
            total = %order.totals.total,
            payment = payment_method.as_str(),
            "Order placed"
        );
        Ok(order)
    }
}
