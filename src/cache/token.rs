use std::fmt;

use serde::{Deserialize, Serialize};

/// Token endpoint response body.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds, as declared by the provider.
    pub expires_in: u64,
    #[serde(default)]
    pub scope: String,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}
