//! Petal Core - Shared types library.
//!
//! This crate provides common types used across all Petal components:
//! - `storefront` - REST client, cart/wishlist state and checkout logic
//! - `cli` - Command-line storefront client
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients, no persistence. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, phone
//!   numbers, quantities and guest session identifiers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
