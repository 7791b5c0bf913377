//! Integration tests for the Petal storefront client.
//!
//! Each test runs a [`Storefront`] against a `wiremock` server standing in
//! for the backend, with client state kept in memory.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p petal-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex, PoisonError};

use petal_storefront::Storefront;
use petal_storefront::config::StorefrontConfig;
use petal_storefront::storage::{MemoryStateStore, StateStore, StorageError};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A storefront pointed at `server`, with fresh in-memory state.
pub fn storefront(server: &MockServer) -> Storefront {
    storefront_with(server, Arc::new(MemoryStateStore::new()))
}

/// A storefront pointed at `server` using `storage`.
pub fn storefront_with(server: &MockServer, storage: Arc<dyn StateStore>) -> Storefront {
    let config = StorefrontConfig::new(&server.uri(), std::env::temp_dir()).unwrap();
    Storefront::with_state_store(config, storage).unwrap()
}

/// 200 response with `data` wrapped in the backend's `{ data }` envelope.
pub fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

/// Error response with a backend-style message.
pub fn error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "success": false, "message": message }))
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn product(id: &str, price: u32) -> Value {
    json!({
        "_id": id,
        "name": format!("Bouquet {id}"),
        "price": price,
        "images": [format!("{id}.jpg")],
        "sizes": ["Small", "Large"]
    })
}

pub fn cart(id: &str, lines: &[(&str, &str, u32, u32)]) -> Value {
    let items: Vec<Value> = lines
        .iter()
        .map(|(item_id, product_id, price, quantity)| {
            json!({
                "_id": item_id,
                "product": product(product_id, *price),
                "quantity": quantity
            })
        })
        .collect();
    json!({ "_id": id, "items": items })
}

pub fn wishlist(id: &str, products: &[(&str, u32)]) -> Value {
    let items: Vec<Value> = products
        .iter()
        .map(|(product_id, price)| {
            json!({ "product": product(product_id, *price), "priceWhenAdded": price })
        })
        .collect();
    json!({ "_id": id, "items": items })
}

pub fn profile() -> Value {
    json!({
        "_id": "u1",
        "firstName": "Asha",
        "lastName": "Rao",
        "email": "asha@example.com",
        "addresses": [{
            "fullName": "Asha Rao",
            "phone": "9876543210",
            "street": "12 MG Road",
            "city": "Bengaluru",
            "state": "Karnataka",
            "pincode": "560001",
            "isDefault": true
        }]
    })
}

pub fn auth_response() -> Value {
    json!({ "accessToken": "token-abc", "user": profile() })
}

/// Sign `storefront` in against a mocked `/auth/login`. No guest id exists
/// yet, so no merge is attempted.
pub async fn sign_in(server: &MockServer, storefront: &Storefront) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ok(auth_response()))
        .mount(server)
        .await;
    storefront
        .login("asha@example.com", "rosebud123")
        .await
        .unwrap();
}

// =============================================================================
// Recording storage
// =============================================================================

/// In-memory storage that records every removal, in order.
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: MemoryStateStore,
    removed: Mutex<Vec<String>>,
}

impl RecordingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys removed so far.
    pub fn removed(&self) -> Vec<String> {
        self.removed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StateStore for RecordingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.removed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(key.to_string());
        self.inner.remove(key)
    }
}
