//! Semantic configuration validation (serde handles syntactic).
//!
//! # Responsibilities
//! - Check the base URL parses and yields a usable mount path
//! - Detect ambiguous proxy prefixes (duplicate LSP ids)
//! - Validate the bind address shape
//!
//! # Design Decisions
//! - Validation is a pure function over the config value
//! - Runs before the config is accepted into the system; failures abort
//!   startup before any request is served

use std::collections::HashSet;

use url::Url;

use crate::config::schema::{GatewayConfig, LspServerDescriptor};
use crate::error::GatewayError;

/// Validate a full config. Returns the first semantic problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), GatewayError> {
    validate_bind_address(&config.listener.bind_address)?;
    normalize_base_url(&config.pipeline.base_url)?;
    ensure_unique_lsp_ids(&config.pipeline.lsp_servers)?;
    Ok(())
}

/// Normalize `base_url` into the mount path for the application router.
///
/// Accepts either an absolute path (`/notebook`) or a full URL
/// (`http://host:2718/notebook`); in the latter case only the path part is
/// kept. Trailing slashes are trimmed so nesting behaves predictably.
pub fn normalize_base_url(base_url: &str) -> Result<String, GatewayError> {
    let path = if base_url.is_empty() {
        "/".to_string()
    } else if base_url.starts_with('/') {
        base_url.to_string()
    } else {
        let url = Url::parse(base_url)
            .map_err(|e| GatewayError::Config(format!("malformed base_url {base_url:?}: {e}")))?;
        url.path().to_string()
    };

    if path.contains(char::is_whitespace) {
        return Err(GatewayError::Config(format!(
            "malformed base_url {base_url:?}: contains whitespace"
        )));
    }

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

/// Each LSP descriptor id becomes a proxy prefix; duplicates would make
/// routing ambiguous, so they are rejected at assembly time.
pub fn ensure_unique_lsp_ids(servers: &[LspServerDescriptor]) -> Result<(), GatewayError> {
    let mut seen = HashSet::new();
    for server in servers {
        if server.port == 0 {
            return Err(GatewayError::Config(format!(
                "lsp server {:?} has port 0",
                server.id
            )));
        }
        if !seen.insert(server.id.as_str()) {
            return Err(GatewayError::Config(format!(
                "duplicate lsp server id {:?}: proxy prefix would be ambiguous",
                server.id
            )));
        }
    }
    Ok(())
}

fn validate_bind_address(addr: &str) -> Result<(), GatewayError> {
    let port = addr.rsplit(':').next().unwrap_or("");
    if addr.rfind(':').is_none() || port.parse::<u16>().is_err() {
        return Err(GatewayError::Config(format!(
            "bind_address {addr:?} is not host:port"
        )));
    }
    Ok(())
}
