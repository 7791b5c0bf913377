//! Overlapping cart mutations, results that land after a logout, and the
//! login pivot without a credential.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use petal_core::CartItemId;
use petal_integration_tests::{auth_response, cart, ok, sign_in, storefront, wishlist};
use petal_storefront::store::{Identity, LoadState};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, path_regex};
use wiremock::{Mock, MockServer};

#[tokio::test]
async fn test_overlapping_adjustments_resolve_in_issue_order() {
    let server = MockServer::start().await;
    let sf = storefront(&server);
    sign_in(&server, &sf).await;

    Mock::given(method("GET"))
        .and(path("/cart/details"))
        .respond_with(ok(cart("uc1", &[("i1", "p1", 399, 1)])))
        .mount(&server)
        .await;

    // The first update is slow; the second must not start until it lands,
    // so it builds on quantity 2 rather than the stale 1.
    Mock::given(method("PUT"))
        .and(path("/cart/item/i1"))
        .and(body_json(json!({ "quantity": 2 })))
        .respond_with(
            ok(cart("uc1", &[("i1", "p1", 399, 2)])).set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/cart/item/i1"))
        .and(body_json(json!({ "quantity": 3 })))
        .respond_with(ok(cart("uc1", &[("i1", "p1", 399, 3)])))
        .expect(1)
        .mount(&server)
        .await;

    sf.load_cart().await.unwrap();

    let item = CartItemId::new("i1");
    let (first, second) = tokio::join!(
        sf.adjust_quantity(item.clone(), 1),
        sf.adjust_quantity(item.clone(), 1)
    );

    assert_eq!(first.unwrap().item_count(), 2);
    assert_eq!(second.unwrap().item_count(), 3);
    assert_eq!(sf.snapshot().cart_count(), 3);
}

#[tokio::test]
async fn test_wishlist_response_after_logout_is_discarded() {
    let server = MockServer::start().await;
    let sf = storefront(&server);
    sign_in(&server, &sf).await;

    Mock::given(method("GET"))
        .and(path("/wishlist"))
        .respond_with(
            ok(wishlist("w1", &[("p1", 399)])).set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (loaded, ()) = tokio::join!(sf.load_wishlist(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        sf.logout().await;
    });

    // The request still completes; its result is not applied.
    assert_eq!(loaded.unwrap().count(), 1);
    let snapshot = sf.snapshot();
    assert_eq!(snapshot.identity(), Identity::Guest);
    assert!(matches!(snapshot.wishlist_state(), LoadState::Idle));
    assert_eq!(snapshot.wishlist_count(), 0);
}

#[tokio::test]
async fn test_logout_during_cart_load_ends_empty() {
    let server = MockServer::start().await;
    let sf = storefront(&server);
    sign_in(&server, &sf).await;

    Mock::given(method("GET"))
        .and(path("/cart/details"))
        .respond_with(
            ok(cart("uc1", &[("i1", "p1", 399, 4)])).set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (loaded, ()) = tokio::join!(sf.load_cart(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        sf.logout().await;
    });

    assert_eq!(loaded.unwrap().item_count(), 4);
    let snapshot = sf.snapshot();
    assert!(matches!(snapshot.cart_state(), LoadState::Idle));
    assert_eq!(snapshot.cart_count(), 0);
    assert!(sf.guest().current().is_none());
}

#[tokio::test]
async fn test_pivot_without_credential_is_ignored() {
    let server = MockServer::start().await;
    let sf = storefront(&server);
    let session_id = sf.guest().get_or_create();

    Mock::given(method("POST"))
        .and(path("/cart/merge"))
        .and(body_json(json!({ "sessionId": session_id.as_str() })))
        .respond_with(ok(cart("uc1", &[])))
        .expect(1)
        .mount(&server)
        .await;

    sf.store().on_login().await;
    assert_eq!(sf.snapshot().identity(), Identity::Guest);

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ok(auth_response()))
        .mount(&server)
        .await;
    sf.login("asha@example.com", "rosebud123").await.unwrap();

    assert_eq!(
        sf.snapshot().identity(),
        Identity::Authenticated { merged: true }
    );
}

#[tokio::test]
async fn test_cart_intent_queued_behind_logout_uses_fresh_guest_id() {
    let server = MockServer::start().await;
    let sf = storefront(&server);
    let old_session = sf.guest().get_or_create();

    Mock::given(method("GET"))
        .and(path_regex(r"^/cart/guest/[^/]+/details$"))
        .respond_with(ok(cart("gc1", &[])).set_delay(Duration::from_millis(200)))
        .mount(&server)
        .await;

    let (_, (), queued) = tokio::join!(
        sf.load_cart(),
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            sf.logout().await;
        },
        async {
            tokio::time::sleep(Duration::from_millis(40)).await;
            sf.load_cart().await
        }
    );

    queued.unwrap();
    let new_session = sf.guest().current().unwrap();
    assert_ne!(new_session, old_session);
}
