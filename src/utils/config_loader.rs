use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::ServiceConfig;
use crate::config::proc_loader::file_to_config;

/// Loads the CLI configuration, keeping the full cause chain for the operator.
pub async fn run(config_path: &str) -> Result<ServiceConfig> {
    debug!("loading config from {}", config_path);
    file_to_config(Path::new(config_path))
        .await
        .with_context(|| format!("Invalid config format in '{}'", config_path))
}
