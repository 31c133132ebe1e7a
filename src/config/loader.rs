//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::validate_config;
use crate::error::GatewayError;

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, GatewayError> {
    let content = fs::read_to_string(path)
        .map_err(|e| GatewayError::Config(format!("read {}: {e}", path.display())))?;
    let config: GatewayConfig = toml::from_str(&content)
        .map_err(|e| GatewayError::Config(format!("parse {}: {e}", path.display())))?;

    validate_config(&config)?;

    Ok(config)
}
