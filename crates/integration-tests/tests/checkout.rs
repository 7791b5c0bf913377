//! Checkout from the cart and buy-now.

#![allow(clippy::unwrap_used)]

use petal_core::{PaymentMethod, ProductId};
use petal_integration_tests::{auth_response, cart, ok, product, profile, storefront};
use petal_storefront::StorefrontError;
use petal_storefront::checkout::CheckoutError;
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer};

async fn signed_in(server: &MockServer) -> petal_storefront::Storefront {
    let sf = storefront(server);
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ok(auth_response()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .respond_with(ok(profile()))
        .mount(server)
        .await;
    sf.login("asha@example.com", "rosebud123").await.unwrap();
    sf
}

#[tokio::test]
async fn test_checkout_from_cart_uses_server_totals() {
    let server = MockServer::start().await;
    let sf = signed_in(&server).await;

    let mut body = cart("uc1", &[("i1", "p1", 1000, 1)]);
    body["totals"] = json!({
        "subtotal": 1000, "discount": 100, "shipping": 0, "tax": 45, "total": 945
    });
    Mock::given(method("GET"))
        .and(path("/cart/details"))
        .respond_with(ok(body))
        .mount(&server)
        .await;

    let session = sf.checkout_from_cart().await.unwrap();
    assert_eq!(session.totals().total, Decimal::from(945));

    let order = sf
        .place_order(&session, 0, PaymentMethod::Cod)
        .await
        .unwrap();
    assert!(order.order_id.as_str().starts_with("ORD-"));
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.shipping_address.city, "Bengaluru");
    assert_eq!(order.totals.discount, Decimal::from(100));
}

#[tokio::test]
async fn test_buy_now_totals() {
    let server = MockServer::start().await;
    let sf = signed_in(&server).await;

    Mock::given(method("GET"))
        .and(path("/product/p1"))
        .respond_with(ok(product("p1", 399)))
        .mount(&server)
        .await;

    let session = sf
        .buy_now(&ProductId::new("p1"), 2, Some("Large".to_string()), None)
        .await
        .unwrap();
    let totals = session.totals();
    assert_eq!(totals.subtotal, Decimal::from(798));
    assert_eq!(totals.shipping, Decimal::from(50));
    assert_eq!(totals.tax, Decimal::from(40));
    assert_eq!(totals.total, Decimal::from(888));

    let err = sf
        .place_order(&session, 4, PaymentMethod::Online)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorefrontError::Checkout(CheckoutError::AddressNotFound(4))
    ));
}

#[tokio::test]
async fn test_empty_cart_cannot_check_out() {
    let server = MockServer::start().await;
    let sf = signed_in(&server).await;

    Mock::given(method("GET"))
        .and(path("/cart/details"))
        .respond_with(ok(cart("uc1", &[])))
        .mount(&server)
        .await;

    let err = sf.checkout_from_cart().await.unwrap_err();
    assert!(matches!(
        err,
        StorefrontError::Checkout(CheckoutError::EmptyCart)
    ));
}
