use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};
use jsonwebtoken::{encode, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::credentials::signing_key::{SigningKey, ASSERTION_ALGORITHM};
use crate::credentials::{
    token_endpoint_url, TokenRequest, CLIENT_ASSERTION_TYPE, FORM_CONTENT_TYPE, GRANT_TYPE,
};
use crate::error::{Error, Result};
use crate::helpers::time::now_i64;

pub const ASSERTION_LIFETIME_SECONDS: i64 = 5 * 60;

/// Credentials that authenticate with a signed JWT bearer assertion.
#[derive(Debug, Clone)]
pub struct PrivateKeyJwtCredentials {
    client_id: String,
    key: SigningKey,
    scope: String,
    host: String,
}

/// Claims carried by the client assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl PrivateKeyJwtCredentials {
    pub fn new(
        client_id: impl Into<String>,
        key: SigningKey,
        scope: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            key,
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

    fn claims(&self) -> AssertionClaims {
        let issued_at = now_i64();
        AssertionClaims {
            iss: self.client_id.clone(),
            sub: self.client_id.clone(),
            aud: self.host.clone(),
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECONDS,
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Builds a fresh compact JWS (`header.claims.signature`).
    pub fn client_assertion(&self) -> Result<String> {
        let header = Header {
            kid: self.key.key_id().map(str::to_owned),
            ..Header::new(ASSERTION_ALGORITHM)
        };
        encode(&header, &self.claims(), self.key.encoding_key())
            .map_err(|e| Error::Signing(format!("client assertion: {e}")))
    }

    pub fn token_request(&self) -> Result<TokenRequest> {
        let assertion = self.client_assertion()?;
        let body = serde_urlencoded::to_string([
            ("grant_type", GRANT_TYPE),
            ("scope", self.scope.as_str()),
            ("client_assertion_type", CLIENT_ASSERTION_TYPE),
            ("client_assertion", assertion.as_str()),
        ])
        .map_err(|e| Error::RequestConstruction(format!("token request form: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(TokenRequest {
            method: Method::POST,
            url: token_endpoint_url(&self.host),
            headers,
            body,
        })
    }
}
