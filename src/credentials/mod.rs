/// Credentials module
///
/// Credential strategies turn configured client credentials into a token
/// endpoint request descriptor. They never perform I/O.
use http::{HeaderMap, Method};

use crate::error::Result;
use crate::utils::constants::{CREDENTIALS_CLIENT_SECRET, CREDENTIALS_PRIVATE_KEY_JWT};

pub mod client_secret;
pub mod private_key_jwt;
pub mod signing_key;

use client_secret::ClientSecretCredentials;
use private_key_jwt::PrivateKeyJwtCredentials;

pub const TOKEN_ENDPOINT: &str = "oauth2/token";
pub const GRANT_TYPE: &str = "client_credentials";
pub const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Everything needed to call the token endpoint.
#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: String,
}

#[derive(Debug, Clone)]
pub enum CredentialStrategy {
    ClientSecret(ClientSecretCredentials),
    PrivateKeyJwt(PrivateKeyJwtCredentials),
}

impl CredentialStrategy {
    pub fn client_id(&self) -> &str {
        match self {
            CredentialStrategy::ClientSecret(c) => c.client_id(),
            CredentialStrategy::PrivateKeyJwt(c) => c.client_id(),
        }
    }

    pub fn host(&self) -> &str {
        match self {
            CredentialStrategy::ClientSecret(c) => c.host(),
            CredentialStrategy::PrivateKeyJwt(c) => c.host(),
        }
    }

    pub fn scope(&self) -> &str {
        match self {
            CredentialStrategy::ClientSecret(c) => c.scope(),
            CredentialStrategy::PrivateKeyJwt(c) => c.scope(),
        }
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CredentialStrategy::ClientSecret(_) => CREDENTIALS_CLIENT_SECRET,
            CredentialStrategy::PrivateKeyJwt(_) => CREDENTIALS_PRIVATE_KEY_JWT,
        }
    }

    pub fn token_request(&self) -> Result<TokenRequest> {
        match self {
            CredentialStrategy::ClientSecret(c) => c.token_request(),
            CredentialStrategy::PrivateKeyJwt(c) => c.token_request(),
        }
    }
}

impl From<ClientSecretCredentials> for CredentialStrategy {
    fn from(credentials: ClientSecretCredentials) -> Self {
        CredentialStrategy::ClientSecret(credentials)
    }
}

impl From<PrivateKeyJwtCredentials> for CredentialStrategy {
    fn from(credentials: PrivateKeyJwtCredentials) -> Self {
        CredentialStrategy::PrivateKeyJwt(credentials)
    }
}

pub fn token_endpoint_url(host: &str) -> String {
    format!("{}/{}", host.trim_end_matches('/'), TOKEN_ENDPOINT)
}
