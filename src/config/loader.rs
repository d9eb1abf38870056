//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{Deployment, RelayConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate a standalone server configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    load_config_for(path, Deployment::Server)
}

/// Load and validate configuration for `deployment` from a TOML file.
pub fn load_config_for(path: &Path, deployment: Deployment) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config_for(&content, deployment)
}

/// Parse and validate a standalone server configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RelayConfig, ConfigError> {
    parse_config_for(content, Deployment::Server)
}

/// Parse and validate configuration for `deployment` from TOML text.
///
/// Settings the document leaves out take the shape's defaults, so a function
/// config without `upstream.timeout_secs` keeps no ceiling of its own.
pub fn parse_config_for(content: &str, deployment: Deployment) -> Result<RelayConfig, ConfigError> {
    let document: toml::Table = toml::from_str(content)?;
    let sets_timeout = document
        .get("upstream")
        .and_then(|upstream| upstream.get("timeout_secs"))
        .is_some();

    let mut config: RelayConfig = toml::Value::Table(document).try_into()?;
    if !sets_timeout {
        config.upstream.timeout_secs = deployment.defaults().upstream.timeout_secs;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
