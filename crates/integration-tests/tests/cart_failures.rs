//! Cart state when requests fail.

#![allow(clippy::unwrap_used)]

use petal_core::{CartItemId, ProductId, Quantity};
use petal_integration_tests::{cart, error, ok, storefront};
use petal_storefront::StorefrontError;
use petal_storefront::api::{AddToCartInput, DiscountCode};
use petal_storefront::store::StoreError;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer};

#[tokio::test]
async fn test_failed_write_keeps_last_snapshot() {
    let server = MockServer::start().await;
    let sf = storefront(&server);

    Mock::given(method("GET"))
        .and(path_regex(r"^/cart/guest/[^/]+/details$"))
        .respond_with(ok(cart("gc1", &[("i1", "p1", 399, 1)])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/cart/guest/[^/]+$"))
        .respond_with(error(500, "Cart service unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    sf.load_cart().await.unwrap();

    let err = sf
        .add_to_cart(AddToCartInput::new(ProductId::new("p2"), Quantity::ONE))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Cart service unavailable");

    let snapshot = sf.snapshot();
    assert!(snapshot.cart_state().error().is_some());
    assert_eq!(snapshot.cart_count(), 1);
}

#[tokio::test]
async fn test_zero_quantity_removes_line() {
    let server = MockServer::start().await;
    let sf = storefront(&server);

    Mock::given(method("DELETE"))
        .and(path_regex(r"^/cart/guest/[^/]+/item/i1$"))
        .respond_with(ok(cart("gc1", &[])))
        .expect(1)
        .mount(&server)
        .await;

    let cart = sf.set_quantity(CartItemId::new("i1"), 0).await.unwrap();
    assert!(cart.is_empty());
}

#[tokio::test]
async fn test_guest_discount_requires_sign_in() {
    let server = MockServer::start().await;
    let sf = storefront(&server);

    let err = sf
        .apply_discount(DiscountCode::Coupon("ROSES10".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorefrontError::Store(StoreError::SignInRequired)
    ));
}

#[tokio::test]
async fn test_guest_wishlist_requires_sign_in() {
    let server = MockServer::start().await;
    let sf = storefront(&server);

    let err = sf.load_wishlist().await.unwrap_err();
    assert!(matches!(
        err,
        StorefrontError::Store(StoreError::SignInRequired)
    ));
    assert_eq!(sf.wishlist_count().await.unwrap(), 0);
}
