/// Sources module
///
/// The token source caches bearer tokens obtained through a credential
/// strategy; resource clients consume it through [`AuthContext`].
use std::future::Future;

use reqwest::Client;

use crate::error::Result;

pub mod token_source;
pub mod transport;

pub use token_source::{TokenSource, TokenSourceBuilder};

/// Capability a resource client needs from whatever authenticates it.
pub trait AuthContext: Send + Sync {
    /// A bearer token that is valid right now.
    fn current_token(&self) -> impl Future<Output = Result<String>> + Send;

    /// Provider base URL, e.g. `https://idp.example`.
    fn base_host(&self) -> &str;

    fn transport(&self) -> &Client;
}
