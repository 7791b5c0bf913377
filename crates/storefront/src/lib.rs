//! Petal storefront client library.
//!
//! Catalog browsing, guest and user carts, wishlist, authentication and
//! checkout against the Petal REST backend.
//!
//! # Layout
//!
//! - [`api`] - typed REST accessors with response caching
//! - [`services`] - guest identity and credential store
//! - [`store`] - cart/wishlist state mirrored from the server
//! - [`checkout`] - totals derivation and order assembly
//! - [`state`] - the [`Storefront`] facade tying them together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod store;

pub use error::{Notice, Operation, StorefrontError};
pub use state::Storefront;
