use std::sync::Arc;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by the token source and the SCIM resource client.
///
/// Errors are cheap to clone: every caller waiting on the same token refresh
/// receives a clone of one error, sharing the underlying cause.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The request descriptor could not be built (bad URL, header value, body).
    #[error("failed to construct request: {0}")]
    RequestConstruction(String),

    /// The client assertion could not be signed, or the key was rejected.
    #[error("failed to sign client assertion: {0}")]
    Signing(String),

    /// Network-level failure while sending the request or reading the body.
    #[error("transport failure: {0}")]
    Transport(#[source] Arc<reqwest::Error>),

    /// The provider answered outside of the expected status set.
    #[error("unexpected response status {code}")]
    UnexpectedStatus { code: u16, body: String },

    /// The response body did not match the expected JSON shape.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] Arc<serde_json::Error>),

    /// The refresh task ended without reporting an outcome.
    #[error("token refresh was abandoned before completion")]
    RefreshAbandoned,
}

impl Error {
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return Error::RequestConstruction(err.to_string());
        }
        Error::Transport(Arc::new(err))
    }

    pub(crate) fn decode(err: serde_json::Error) -> Self {
        Error::Decode(Arc::new(err))
    }

    pub(crate) fn unexpected_status(code: u16, body: &[u8]) -> Self {
        Error::UnexpectedStatus {
            code,
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }

    /// Status code reported by the provider, if the failure carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::UnexpectedStatus { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// `true` when the provider rejected the bearer token (HTTP 401).
    ///
    /// Callers use this to decide whether to force a token refresh and retry.
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }

    /// `true` for failures worth retrying: network errors, 429 and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::UnexpectedStatus { code, .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}
