//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Validates provider host, credential sources, retry and logging invariants

use tracing::{error, warn};

use crate::config::settings::{RetryConfig, SettingsConfig};
use crate::config::sources::{CredentialsConfig, ProviderConfig, ServiceConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_provider(&cfg.provider, &mut errors);
    validate_credentials(&cfg.credentials, &mut errors);
    validate_settings(&cfg.settings, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        for e in &errors {
            error!("config validation: {}", e);
        }
        Err(errors)
    }
}

fn validate_provider(provider: &ProviderConfig, errors: &mut Vec<String>) {
    let host = provider.host.trim();
    if host.is_empty() {
        errors.push("provider.host must not be empty".to_string());
    } else if !(host.starts_with("https://") || host.starts_with("http://")) {
        errors.push(format!(
            "provider.host '{}' must start with http:// or https://",
            host
        ));
    }
    if provider.scope.trim().is_empty() {
        warn!("provider.scope is empty; the provider will grant its default scopes");
    }
}

fn validate_credentials(credentials: &CredentialsConfig, errors: &mut Vec<String>) {
    if credentials.client_id().is_blank() {
        errors.push("credentials.client_id must not be empty".to_string());
    }
    match credentials {
        CredentialsConfig::ClientSecret { client_secret, .. } => {
            if client_secret.is_blank() {
                errors.push("credentials.client_secret must not be empty".to_string());
            }
        }
        CredentialsConfig::PrivateKeyJwt {
            private_key,
            key_id,
            ..
        } => {
            if private_key.is_blank() {
                errors.push("credentials.private_key must not be empty".to_string());
            }
            if key_id.as_ref().is_some_and(|kid| kid.trim().is_empty()) {
                errors.push("credentials.key_id must not be blank when set".to_string());
            }
        }
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(retry) = &settings.retry {
        validate_retry(retry, errors);
    }
    if settings.http.timeout_ms == Some(0) {
        errors.push("settings.http.timeout_ms must be > 0".to_string());
    }
    if settings.http.insecure_skip_tls_verify {
        warn!("settings.http.insecure_skip_tls_verify is enabled; TLS certificates will NOT be verified");
    }
    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
}

fn validate_retry(retry: &RetryConfig, errors: &mut Vec<String>) {
    if retry.attempts == Some(0) {
        errors.push("settings.retry.attempts must be >= 1".to_string());
    }
    if let (Some(base), Some(max)) = (retry.base_delay_ms, retry.max_delay_ms) {
        if max < base {
            errors.push(format!(
                "settings.retry.max_delay_ms ({}) must be >= base_delay_ms ({})",
                max, base
            ));
        }
    }
}
