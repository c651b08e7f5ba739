use std::time::Duration;

use serde::Deserialize;

use crate::resilience::retry::RetrySettings;
use crate::sources::transport::TransportSettings;
use crate::utils::constants::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_SAFETY_MARGIN_SECS,
};

/// ================================
/// Global client settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SettingsConfig {
    pub safety_margin_seconds: Option<u64>,
    #[serde(default)]
    pub http: HttpConfig,
    pub retry: Option<RetryConfig>,
    pub logging: Option<LoggingConfig>,
}

impl SettingsConfig {
    pub fn safety_margin(&self) -> Duration {
        Duration::from_secs(self.safety_margin_seconds.unwrap_or(DEFAULT_SAFETY_MARGIN_SECS))
    }
}

/// ================================
/// HTTP transport
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct HttpConfig {
    pub timeout_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    /// never enable outside of test environments
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
}

impl HttpConfig {
    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            timeout: Some(Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_HTTP_TIMEOUT_MS))),
            connect_timeout: Some(Duration::from_millis(
                self.connect_timeout_ms.unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS),
            )),
            insecure_skip_tls_verify: self.insecure_skip_tls_verify,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    pub attempts: Option<u32>,
    /// doubled on every attempt until max_delay_ms
    pub base_delay_ms: Option<u64>,
    /// invariant: >= base_delay_ms
    pub max_delay_ms: Option<u64>,
}

impl RetryConfig {
    pub fn to_settings(retry: &Option<RetryConfig>) -> RetrySettings {
        let defaults = RetrySettings::default();
        RetrySettings {
            attempts: retry.as_ref().and_then(|r| r.attempts).unwrap_or(defaults.attempts),
            base_delay_ms: retry.as_ref().and_then(|r| r.base_delay_ms).unwrap_or(defaults.base_delay_ms),
            max_delay_ms: retry.as_ref().and_then(|r| r.max_delay_ms).unwrap_or(defaults.max_delay_ms),
        }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new("info".to_owned(), LogFormat::Compact)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}
