//! Guest cart building and the login pivot.

#![allow(clippy::unwrap_used)]

use petal_core::{ProductId, Quantity};
use petal_integration_tests::{auth_response, cart, error, ok, storefront};
use petal_storefront::api::AddToCartInput;
use petal_storefront::store::Identity;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer};

#[tokio::test]
async fn test_guest_cart_is_merged_once_on_login() {
    let server = MockServer::start().await;
    let sf = storefront(&server);

    Mock::given(method("POST"))
        .and(path_regex(r"^/cart/guest/session_[0-9a-f-]+$"))
        .respond_with(ok(cart("gc1", &[("i1", "p1", 399, 2)])))
        .expect(1)
        .mount(&server)
        .await;

    let mut input = AddToCartInput::new(ProductId::new("p1"), Quantity::new(2).unwrap());
    input.size = Some("Large".to_string());
    let guest_cart = sf.add_to_cart(input).await.unwrap();
    assert_eq!(guest_cart.item_count(), 2);
    assert_eq!(sf.snapshot().cart_count(), 2);

    let session_id = sf.guest().current().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ok(auth_response()))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/cart/merge"))
        .and(header("Authorization", "Bearer token-abc"))
        .and(body_json(json!({ "sessionId": session_id.as_str() })))
        .respond_with(ok(cart("uc1", &[("i1", "p1", 399, 2), ("i9", "p9", 250, 1)])))
        .expect(1)
        .mount(&server)
        .await;

    sf.login("asha@example.com", "rosebud123").await.unwrap();

    let snapshot = sf.snapshot();
    assert_eq!(snapshot.identity(), Identity::Authenticated { merged: true });
    assert_eq!(snapshot.cart_count(), 3);

    // Already signed in: no second merge.
    sf.login("asha@example.com", "rosebud123").await.unwrap();
    assert_eq!(sf.snapshot().cart_count(), 3);
}

#[tokio::test]
async fn test_already_merged_conflict_is_ignored() {
    let server = MockServer::start().await;
    let sf = storefront(&server);

    let session_id = sf.guest().get_or_create();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ok(auth_response()))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/cart/merge"))
        .respond_with(error(409, "Guest cart already merged"))
        .expect(1)
        .mount(&server)
        .await;

    let profile = sf.login("asha@example.com", "rosebud123").await.unwrap();
    assert_eq!(profile.display_name(), "Asha Rao");

    let snapshot = sf.snapshot();
    assert!(snapshot.identity().is_authenticated());
    assert!(snapshot.cart_state().error().is_none());
    assert!(snapshot.cart().is_none());
    assert_eq!(sf.guest().current(), Some(session_id));
}

#[tokio::test]
async fn test_login_without_guest_cart_skips_merge() {
    let server = MockServer::start().await;
    let sf = storefront(&server);

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ok(auth_response()))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/cart/merge"))
        .respond_with(ok(cart("uc1", &[])))
        .expect(0)
        .mount(&server)
        .await;

    sf.login("asha@example.com", "rosebud123").await.unwrap();
    assert!(sf.is_authenticated());
}
