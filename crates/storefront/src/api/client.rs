//! Storefront REST API client implementation.
//!
//! Uses `reqwest` for HTTP and caches reads with `moka`. Reads go through
//! `try_get_with`, so identical concurrent reads coalesce into one request
//! and every caller observes the same result.

use std::future::Future;
use std::sync::Arc;

use moka::future::Cache;
use petal_core::{CartItemId, CategoryId, GuestSessionId, ProductId, UserId};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, instrument};
use url::Url;

use crate::api::ApiError;
use crate::api::cache::{CacheKey, CacheTag, CacheValue, Cacheable};
use crate::api::types::{
    AddToCartInput, AuthResponse, Cart, CartOwner, CartValidation, Category, DiscountCode,
    LoginRequest, MergeRequest, MoveToCartInput, MoveToCartOutcome, Product, Profile,
    ProfileUpdate, SignupRequest, SubCategory, ToggleOutcome, UpdateQuantityRequest, Wishlist,
    WishlistCount, WishlistProductRequest,
};
use crate::config::ApiConfig;
use crate::models::session::Credential;

/// Maximum characters of a response body to include in logs.
const LOG_BODY_LIMIT: usize = 500;

/// Response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Error body shape returned on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST API.
///
/// Cheap to clone; all clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    credential: watch::Receiver<Credential>,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// The client attaches `Authorization: Bearer <token>` whenever the
    /// credential behind `credential` carries a token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be constructed.
    pub fn new(
        config: &ApiConfig,
        credential: watch::Receiver<Credential>,
    ) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .support_invalidation_closures()
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                credential,
                cache,
            }),
        })
    }

    /// Build a request for `path` relative to the base URL.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.inner.base_url.join(path.trim_start_matches('/'))?;

        let mut builder = self
            .inner
            .client
            .request(method, url)
            .header("Content-Type", "application/json");

        if let Some(token) = self.inner.credential.borrow().access_token() {
            builder = builder.bearer_auth(token.expose_secret());
        }

        Ok(builder)
    }

    /// Send a request and unwrap the `{ data }` envelope.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status, &response_text));
        }

        match serde_json::from_str::<Envelope<T>>(&response_text) {
            Ok(envelope) => Ok(envelope.data),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %truncate(&response_text),
                    "Failed to parse storefront API response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }

    /// Read through the cache, sharing any in-flight request for `key`.
    async fn cached<T, F>(&self, key: CacheKey, fetch: F) -> Result<T, ApiError>
    where
        T: Cacheable,
        F: Future<Output = Result<T, ApiError>>,
    {
        if let Some(hit) = self.inner.cache.get(&key).await {
            debug!(key = ?key, "Cache hit");
            return T::from_value(hit).ok_or_else(|| ApiError::CacheMismatch(format!("{key:?}")));
        }

        let value = self
            .inner
            .cache
            .try_get_with(key.clone(), async { fetch.await.map(Cacheable::into_value) })
            .await
            .map_err(ApiError::from_shared)?;

        T::from_value(value).ok_or_else(|| ApiError::CacheMismatch(format!("{key:?}")))
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the signup.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub(crate) async fn signup(&self, request: &SignupRequest<'_>) -> Result<AuthResponse, ApiError> {
        self.execute(self.request(Method::POST, "auth/signup")?.json(request))
            .await
    }

    /// Exchange email and password for an access token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for rejected credentials, or another
    /// error if the request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub(crate) async fn login(&self, request: &LoginRequest<'_>) -> Result<AuthResponse, ApiError> {
        self.execute(self.request(Method::POST, "auth/login")?.json(request))
            .await
    }

    /// Get the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<Profile, ApiError> {
        self.cached(CacheKey::Profile, async {
            self.execute(self.request(Method::GET, "auth/profile")?)
                .await
        })
        .await
    }

    /// Update the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, ApiError> {
        let profile: Profile = self
            .execute(self.request(Method::PATCH, "auth/profile")?.json(update))
            .await?;
        self.invalidate(&[CacheTag::Profile]).await;
        Ok(profile)
    }

    /// Get a user's public profile by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not found or the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn user_by_id(&self, user_id: &UserId) -> Result<Profile, ApiError> {
        let path = format!("auth/user/{}", segment(user_id.as_str()));
        self.cached(CacheKey::User(user_id.clone()), async {
            self.execute(self.request(Method::GET, &path)?).await
        })
        .await
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get a page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, page: u32) -> Result<Vec<Product>, ApiError> {
        let path = format!("product?page={page}");
        self.cached(CacheKey::Products { page }, async {
            self.execute(self.request(Method::GET, &path)?).await
        })
        .await
    }

    /// Search products by free text. Search results are not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let path = format!("product/search?q={}", segment(query));
        self.execute(self.request(Method::GET, &path)?).await
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product(&self, product_id: &ProductId) -> Result<Product, ApiError> {
        let path = format!("product/{}", segment(product_id.as_str()));
        self.cached(CacheKey::Product(product_id.clone()), async {
            self.execute(self.request(Method::GET, &path)?).await
        })
        .await
    }

    /// Get all products in a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn products_by_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<Product>, ApiError> {
        let path = format!("product/category/{}", segment(category_id.as_str()));
        self.cached(CacheKey::ProductsByCategory(category_id.clone()), async {
            self.execute(self.request(Method::GET, &path)?).await
        })
        .await
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.cached(CacheKey::Categories, async {
            self.execute(self.request(Method::GET, "category")?).await
        })
        .await
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found or the request fails.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn category(&self, category_id: &CategoryId) -> Result<Category, ApiError> {
        let path = format!("category/{}", segment(category_id.as_str()));
        self.cached(CacheKey::Category(category_id.clone()), async {
            self.execute(self.request(Method::GET, &path)?).await
        })
        .await
    }

    /// List all sub-categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn sub_categories(&self) -> Result<Vec<SubCategory>, ApiError> {
        self.cached(CacheKey::SubCategories, async {
            self.execute(self.request(Method::GET, "sub-category")?)
                .await
        })
        .await
    }

    /// List the sub-categories of one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn sub_categories_by_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<SubCategory>, ApiError> {
        let path = format!("sub-category/category/{}", segment(category_id.as_str()));
        self.cached(CacheKey::SubCategoriesByCategory(category_id.clone()), async {
            self.execute(self.request(Method::GET, &path)?).await
        })
        .await
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Get the owner's cart.
    ///
    /// Guest carts use `GET /cart/guest/:sessionId`; the user cart has no
    /// summary endpoint and reads its details instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn cart(&self, owner: &CartOwner) -> Result<Cart, ApiError> {
        match owner {
            CartOwner::User => self.cart_details(owner).await,
            CartOwner::Guest(session) => {
                let path = guest_cart_path(session);
                self.cached(CacheKey::Cart(owner.clone()), async {
                    self.execute(self.request(Method::GET, &path)?).await
                })
                .await
            }
        }
    }

    /// Get the owner's cart with populated products and totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn cart_details(&self, owner: &CartOwner) -> Result<Cart, ApiError> {
        let path = match owner {
            CartOwner::User => "cart/details".to_string(),
            CartOwner::Guest(session) => format!("{}/details", guest_cart_path(session)),
        };
        self.cached(CacheKey::CartDetails(owner.clone()), async {
            self.execute(self.request(Method::GET, &path)?).await
        })
        .await
    }

    /// Add a product to the owner's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, input), fields(product_id = %input.product_id, quantity = %input.quantity))]
    pub async fn add_to_cart(
        &self,
        owner: &CartOwner,
        input: &AddToCartInput,
    ) -> Result<Cart, ApiError> {
        let path = match owner {
            CartOwner::User => "cart".to_string(),
            CartOwner::Guest(session) => guest_cart_path(session),
        };
        self.cart_mutation(owner, self.request(Method::POST, &path)?.json(input))
            .await
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn update_cart_item(
        &self,
        owner: &CartOwner,
        item_id: &CartItemId,
        quantity: petal_core::Quantity,
    ) -> Result<Cart, ApiError> {
        let path = cart_item_path(owner, item_id);
        self.cart_mutation(
            owner,
            self.request(Method::PUT, &path)?
                .json(&UpdateQuantityRequest { quantity }),
        )
        .await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_cart_item(
        &self,
        owner: &CartOwner,
        item_id: &CartItemId,
    ) -> Result<Cart, ApiError> {
        let path = cart_item_path(owner, item_id);
        self.cart_mutation(owner, self.request(Method::DELETE, &path)?)
            .await
    }

    /// Remove every line from the user cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<Cart, ApiError> {
        self.cart_mutation(
            &CartOwner::User,
            self.request(Method::DELETE, "cart/clear")?,
        )
        .await
    }

    /// Check stock and pricing of the user cart before checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn validate_cart(&self) -> Result<CartValidation, ApiError> {
        self.execute(self.request(Method::POST, "cart/validate")?)
            .await
    }

    /// Apply a coupon or voucher to the user cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is rejected or the request fails.
    #[instrument(skip(self), fields(code = %code.code()))]
    pub async fn apply_discount(&self, code: &DiscountCode) -> Result<Cart, ApiError> {
        self.cart_mutation(
            &CartOwner::User,
            self.request(Method::POST, "cart/apply-discount")?
                .json(code),
        )
        .await
    }

    /// Remove any applied coupon or voucher from the user cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn remove_discount(&self) -> Result<Cart, ApiError> {
        self.cart_mutation(
            &CartOwner::User,
            self.request(Method::DELETE, "cart/remove-discount")?,
        )
        .await
    }

    /// Fold a guest cart into the authenticated user's cart.
    ///
    /// Invalidates both the guest and the user cart on success.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Conflict` if the backend reports the guest cart was
    /// already merged, or another error if the request fails.
    #[instrument(skip(self), fields(session_id = %session_id))]
    pub async fn merge_guest_cart(&self, session_id: &GuestSessionId) -> Result<Cart, ApiError> {
        let cart: Cart = self
            .execute(
                self.request(Method::POST, "cart/merge")?
                    .json(&MergeRequest { session_id }),
            )
            .await?;

        self.invalidate(&[
            CacheTag::Cart(CartOwner::Guest(session_id.clone())),
            CacheTag::Cart(CartOwner::User),
        ])
        .await;

        Ok(cart)
    }

    async fn cart_mutation(
        &self,
        owner: &CartOwner,
        request: RequestBuilder,
    ) -> Result<Cart, ApiError> {
        let cart: Cart = self.execute(request).await?;
        self.invalidate(&[CacheTag::Cart(owner.clone())]).await;
        Ok(cart)
    }

    // =========================================================================
    // Wishlist Methods
    // =========================================================================

    /// Create the user's wishlist if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn create_wishlist(&self) -> Result<Wishlist, ApiError> {
        self.wishlist_mutation(self.request(Method::POST, "wishlist")?)
            .await
    }

    /// Get the user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn wishlist(&self) -> Result<Wishlist, ApiError> {
        self.cached(CacheKey::Wishlist, async {
            self.execute(self.request(Method::GET, "wishlist")?).await
        })
        .await
    }

    /// Get the number of products on the user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn wishlist_count(&self) -> Result<u32, ApiError> {
        self.cached(CacheKey::WishlistCount, async {
            let count: WishlistCount = self
                .execute(self.request(Method::GET, "wishlist/count")?)
                .await?;
            Ok(count.count)
        })
        .await
    }

    /// Save a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_wishlist(&self, product_id: &ProductId) -> Result<Wishlist, ApiError> {
        self.wishlist_mutation(
            self.request(Method::POST, "wishlist/add")?
                .json(&WishlistProductRequest { product_id }),
        )
        .await
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_from_wishlist(&self, product_id: &ProductId) -> Result<Wishlist, ApiError> {
        let path = format!("wishlist/item/{}", segment(product_id.as_str()));
        self.wishlist_mutation(self.request(Method::DELETE, &path)?)
            .await
    }

    /// Add the product if absent, remove it if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn toggle_wishlist(&self, product_id: &ProductId) -> Result<ToggleOutcome, ApiError> {
        let outcome: ToggleOutcome = self
            .execute(
                self.request(Method::POST, "wishlist/toggle")?
                    .json(&WishlistProductRequest { product_id }),
            )
            .await?;
        self.invalidate(&[CacheTag::Wishlist]).await;
        Ok(outcome)
    }

    /// Move a wishlist product into the user cart in one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, input), fields(product_id = %input.product_id))]
    pub async fn move_to_cart(&self, input: &MoveToCartInput) -> Result<MoveToCartOutcome, ApiError> {
        let outcome: MoveToCartOutcome = self
            .execute(
                self.request(Method::POST, "wishlist/move-to-cart")?
                    .json(input),
            )
            .await?;
        self.invalidate(&[CacheTag::Wishlist, CacheTag::Cart(CartOwner::User)])
            .await;
        Ok(outcome)
    }

    /// Remove every product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn clear_wishlist(&self) -> Result<Wishlist, ApiError> {
        self.wishlist_mutation(self.request(Method::DELETE, "wishlist/clear")?)
            .await
    }

    async fn wishlist_mutation(&self, request: RequestBuilder) -> Result<Wishlist, ApiError> {
        let wishlist: Wishlist = self.execute(request).await?;
        self.invalidate(&[CacheTag::Wishlist]).await;
        Ok(wishlist)
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate every cached entry carrying one of `tags`.
    pub async fn invalidate(&self, tags: &[CacheTag]) {
        for tag in tags {
            if let Some(keys) = tag.keys() {
                for key in keys {
                    self.inner.cache.invalidate(&key).await;
                }
                continue;
            }

            let target = tag.clone();
            if let Err(e) = self
                .inner
                .cache
                .invalidate_entries_if(move |key, _| key.tag() == target)
            {
                tracing::warn!(error = %e, tag = ?tag, "Failed to register cache invalidation");
            }
        }
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Percent-encode a single path segment.
fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

fn guest_cart_path(session: &GuestSessionId) -> String {
    format!("cart/guest/{}", segment(session.as_str()))
}

fn cart_item_path(owner: &CartOwner, item_id: &CartItemId) -> String {
    match owner {
        CartOwner::User => format!("cart/item/{}", segment(item_id.as_str())),
        CartOwner::Guest(session) => format!(
            "{}/item/{}",
            guest_cart_path(session),
            segment(item_id.as_str())
        ),
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}

/// Map a non-2xx response onto the error taxonomy.
fn classify_failure(status: StatusCode, body: &str) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.error)
        .unwrap_or_else(|| truncate(body));

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::CONFLICT => ApiError::Conflict(message),
        _ => {
            tracing::error!(
                status = %status,
                body = %truncate(body),
                "Storefront API returned non-success status"
            );
            ApiError::Server {
                status: status.as_u16(),
                message,
            }
        }
    }
}
