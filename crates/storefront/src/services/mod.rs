//! Business logic services for storefront.
//!
//! # Services
//!
//! - `guest` - Anonymous guest session identity
//! - `auth` - Credential store: login, signup, logout and token persistence

pub mod auth;
pub mod guest;

pub use auth::{AuthError, CredentialStore, FieldErrors, SignupForm};
pub use guest::GuestIdentity;
