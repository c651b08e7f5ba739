use std::{env, fs};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::config::settings::SettingsConfig;


/// ================================
/// Full client configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub provider: ProviderConfig,
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// ================================
/// Identity provider
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// e.g. https://localhost:9444
    pub host: String,
    /// space separated scopes requested with every token
    #[serde(default)]
    pub scope: String,
}

/// ================================
/// Credentials
/// ================================
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialsConfig {
    ClientSecret {
        client_id: SecretValue,
        client_secret: SecretValue,
    },
    PrivateKeyJwt {
        client_id: SecretValue,
        /// PEM encoded RSA private key (PKCS#8 or PKCS#1)
        private_key: SecretValue,
        key_id: Option<String>,
    },
}

impl CredentialsConfig {
    pub fn client_id(&self) -> &SecretValue {
        match self {
            CredentialsConfig::ClientSecret { client_id, .. } => client_id,
            CredentialsConfig::PrivateKeyJwt { client_id, .. } => client_id,
        }
    }
}

/// Where a credential value comes from
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum SecretValue {
    Literal {
        value: String,
    },
    FromEnv {
        from_env: String,
    },
    FromFile {
        path: String,
    },
}

impl SecretValue {
    pub fn resolve(&self) -> Result<String> {
        match self {
            SecretValue::Literal { value } => Ok(value.to_owned()),
            SecretValue::FromEnv { from_env } => env::var(from_env)
                .map_err(|err| anyhow!("environment variable '{}': {}", from_env, err)),
            SecretValue::FromFile { path } => fs::read_to_string(path)
                .with_context(|| format!("reading secret file '{}'", path))
                .map(|res| res.trim().to_string()),
        }
    }

    /// Validation-time check that does not touch the environment or disk.
    pub fn is_blank(&self) -> bool {
        match self {
            SecretValue::Literal { value } => value.trim().is_empty(),
            SecretValue::FromEnv { from_env } => from_env.trim().is_empty(),
            SecretValue::FromFile { path } => path.trim().is_empty(),
        }
    }
}
