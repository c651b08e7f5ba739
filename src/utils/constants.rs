//! Shared constants and defaults

use std::time::Duration;

/// Subtracted from the provider-declared token lifetime.
pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 1;
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(DEFAULT_SAFETY_MARGIN_SECS);
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 3_000;

// Supported credential types
pub const CREDENTIALS_CLIENT_SECRET: &str = "client_secret";
pub const CREDENTIALS_PRIVATE_KEY_JWT: &str = "private_key_jwt";
