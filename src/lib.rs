//! # SCIM Token Client Library
//!
//! Obtains OAuth2 client-credentials tokens (shared secret or private key
//! JWT assertion), caches them until shortly before expiry with single-flight
//! refresh, and uses them to drive a generic SCIM 2.0 resource client.
//!
//! Modules:
//! - `credentials`: credential strategies producing token endpoint requests
//! - `cache`: token value and expiry bookkeeping
//! - `sources`: the token source, its capability trait and HTTP transport
//! - `scim`: authenticated CRUD/search over SCIM collections
//! - `config`: YAML configuration for embedding applications and the CLI

pub mod config;
pub mod cache;
pub mod credentials;
pub mod error;
pub mod sources;
pub mod scim;
pub mod resilience;
pub mod observability;
pub mod helpers;
pub mod utils;
#[cfg(test)]
pub mod tests;


pub use crate::config::sources::*;
pub use crate::error::{Error, Result};
pub use crate::sources::{AuthContext, TokenSource};
