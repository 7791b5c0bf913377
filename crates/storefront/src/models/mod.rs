//! Client-side state models for the storefront.

pub mod session;

pub use session::{Credential, keys};
