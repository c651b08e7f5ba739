use anyhow::{Context, Result};
use tracing::info;

use crate::config::sources::{CredentialsConfig, ServiceConfig};
use crate::credentials::client_secret::ClientSecretCredentials;
use crate::credentials::private_key_jwt::PrivateKeyJwtCredentials;
use crate::credentials::signing_key::SigningKey;
use crate::credentials::CredentialStrategy;
use crate::sources::transport::build_client;
use crate::sources::TokenSource;

impl ServiceConfig {
    /// Resolves secrets and builds the credential strategy described by the config.
    pub fn credential_strategy(&self) -> Result<CredentialStrategy> {
        let host = self.provider.host.to_owned();
        let scope = self.provider.scope.to_owned();
        let client_id = self.credentials.client_id().resolve()?;

        let strategy = match &self.credentials {
            CredentialsConfig::ClientSecret { client_secret, .. } => {
                let secret = client_secret.resolve()?;
                ClientSecretCredentials::new(client_id, secret, scope, host).into()
            }
            CredentialsConfig::PrivateKeyJwt {
                private_key,
                key_id,
                ..
            } => {
                let pem = private_key.resolve()?;
                let mut key = SigningKey::from_pem(&pem).context("loading private key")?;
                if let Some(key_id) = key_id {
                    key = key.with_key_id(key_id.to_owned());
                }
                PrivateKeyJwtCredentials::new(client_id, key, scope, host).into()
            }
        };
        Ok(strategy)
    }

    pub fn build_token_source(&self) -> Result<TokenSource> {
        let strategy = self.credential_strategy()?;
        let client = build_client(&self.settings.http.transport_settings())
            .context("building HTTP client")?;

        info!(
            host = %self.provider.host,
            client_id = strategy.client_id(),
            strategy = strategy.kind(),
            "token source configured"
        );

        Ok(TokenSource::builder(strategy)
            .client(client)
            .safety_margin(self.settings.safety_margin())
            .build())
    }
}
