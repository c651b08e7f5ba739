use std::time::Duration;

use reqwest::Client;
use tracing::warn;

use crate::error::{Error, Result};
use crate::utils::constants::{DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_HTTP_TIMEOUT_MS};

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    /// Disables TLS certificate verification. Test environments only.
    pub insecure_skip_tls_verify: bool,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS)),
            connect_timeout: Some(Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS)),
            insecure_skip_tls_verify: false,
        }
    }
}

/// Builds the shared HTTP client. Certificates are verified unless the
/// caller explicitly opts out.
pub fn build_client(settings: &TransportSettings) -> Result<Client> {
    let mut builder = Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));

    if let Some(timeout) = settings.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(connect_timeout) = settings.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }
    if settings.insecure_skip_tls_verify {
        warn!("TLS certificate verification is DISABLED (insecure_skip_tls_verify); never use this against production providers");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder.build().map_err(Error::transport)
}
