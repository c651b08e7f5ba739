use std::fmt;

use jsonwebtoken::{crypto, Algorithm, EncodingKey};

use crate::error::{Error, Result};

/// Signs client assertions with PS256.
pub const ASSERTION_ALGORITHM: Algorithm = Algorithm::PS256;

/// RSA private key used to sign client assertions.
///
/// Keys are checked once at load time, so a key that loads always signs.
#[derive(Clone)]
pub struct SigningKey {
    key_id: Option<String>,
    encoding: EncodingKey,
}

impl SigningKey {
    /// Accepts `BEGIN PRIVATE KEY` (PKCS#8) and `BEGIN RSA PRIVATE KEY` (PKCS#1).
    pub fn from_pem(pem: &str) -> Result<Self> {
        let encoding = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| Error::Signing(format!("private key rejected: {e}")))?;
        Self::checked(encoding)
    }

    /// DER encoded PKCS#1 `RSAPrivateKey`.
    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self> {
        Self::checked(EncodingKey::from_rsa_der(der))
    }

    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    fn checked(encoding: EncodingKey) -> Result<Self> {
        // well formed PEM may still carry a non RSA or truncated key
        crypto::sign(b"key check", &encoding, ASSERTION_ALGORITHM)
            .map_err(|e| Error::Signing(format!("private key rejected: {e}")))?;
        Ok(Self {
            key_id: None,
            encoding,
        })
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_id", &self.key_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}
