//! Read-through caching of catalog reads.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use petal_core::ProductId;
use petal_integration_tests::{ok, product, storefront};
use rust_decimal::Decimal;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer};

#[tokio::test]
async fn test_concurrent_reads_share_one_request() {
    let server = MockServer::start().await;
    let sf = storefront(&server);

    Mock::given(method("GET"))
        .and(path("/product/p1"))
        .respond_with(ok(product("p1", 399)).set_delay(Duration::from_millis(100)))
        .expect(1)
        .mount(&server)
        .await;

    let id = ProductId::new("p1");
    let (a, b) = tokio::join!(sf.api().product(&id), sf.api().product(&id));
    assert_eq!(a.unwrap(), b.unwrap());

    // Served from cache.
    let again = sf.api().product(&id).await.unwrap();
    assert_eq!(again.price, Decimal::from(399));
}

#[tokio::test]
async fn test_search_is_not_cached() {
    let server = MockServer::start().await;
    let sf = storefront(&server);

    Mock::given(method("GET"))
        .and(path("/product/search"))
        .respond_with(ok(serde_json::json!([product("p1", 399)])))
        .expect(2)
        .mount(&server)
        .await;

    assert_eq!(sf.api().search_products("rose").await.unwrap().len(), 1);
    assert_eq!(sf.api().search_products("rose").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_read_is_not_cached() {
    let server = MockServer::start().await;
    let sf = storefront(&server);

    Mock::given(method("GET"))
        .and(path("/category"))
        .respond_with(petal_integration_tests::error(500, "Database unavailable"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/category"))
        .respond_with(ok(serde_json::json!([{ "_id": "c1", "name": "Roses" }])))
        .expect(1)
        .mount(&server)
        .await;

    assert!(sf.api().categories().await.is_err());
    let categories = sf.api().categories().await.unwrap();
    assert_eq!(categories.len(), 1);
}
