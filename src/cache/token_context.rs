use std::time::{Duration, Instant};

use crate::cache::token::Token;

/// Provider lifetimes beyond this are treated as this long.
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// A fetched token together with the instant it stops being served.
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub token: Token,
    /// `fetched_at + expires_in - safety_margin`
    pub expires_at: Instant,
}

impl CachedToken {
    pub fn new(token: Token, fetched_at: Instant, safety_margin: Duration) -> Self {
        let lifetime = Duration::from_secs(token.expires_in)
            .min(MAX_TOKEN_LIFETIME)
            .saturating_sub(safety_margin);
        // an unrepresentable instant is served as already expired
        let expires_at = fetched_at.checked_add(lifetime).unwrap_or(fetched_at);
        Self { token, expires_at }
    }

    /// Usable strictly before `expires_at`.
    pub fn is_valid_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    pub fn access_token(&self) -> &str {
        &self.token.access_token
    }
}
