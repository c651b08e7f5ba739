use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};

use crate::credentials::{token_endpoint_url, TokenRequest, FORM_CONTENT_TYPE, GRANT_TYPE};
use crate::error::{Error, Result};

/// Shared-secret credentials sent with HTTP basic authentication.
#[derive(Clone)]
pub struct ClientSecretCredentials {
    client_id: String,
    client_secret: String,
    scope: String,
    host: String,
}

impl ClientSecretCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scope: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: scope.into(),
            host: host.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn token_request(&self) -> Result<TokenRequest> {
        let basic = STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));
        let mut authorization = HeaderValue::from_str(&format!("Basic {basic}"))
            .map_err(|e| Error::RequestConstruction(format!("invalid basic auth header: {e}")))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(TokenRequest {
            method: Method::POST,
            url: token_endpoint_url(&self.host),
            headers,
            body: format!("grant_type={GRANT_TYPE}&scope={}", self.scope),
        })
    }
}

impl fmt::Debug for ClientSecretCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecretCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .field("host", &self.host)
            .finish()
    }
}
