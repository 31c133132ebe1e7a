//! Configuration schema definitions.
//!
//! All file-loadable types derive Serde traits for deserialization from
//! TOML. `extra_layers` is the one programmatic-only field: caller-supplied
//! middleware cannot come from a config file.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::pipeline::LayerSpec;

/// Root configuration for the gateway.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Middleware chain and proxy configuration.
    pub pipeline: PipelineConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:2718"). A hostname is accepted and
    /// resolved at bind time.
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:2718".to_string(),
        }
    }
}

/// Everything the pipeline assembler consumes.
///
/// Constructed once per server start, immutable thereafter. No field is
/// mutated after assembly; changing any of them requires rebuilding the
/// whole chain.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Path (or full URL) the application's route table is mounted under.
    pub base_url: String,

    /// Public hostname this server is reachable as. Joins the default
    /// origin allow-list when `allow_origins` is not set.
    pub host: Option<String>,

    /// Whether requests must carry a valid session or bearer credential.
    pub enable_auth: bool,

    /// Explicit origin allow-list (host names). `None` means "derive the
    /// local-only default"; it never means "allow all".
    pub allow_origins: Option<BTreeSet<String>>,

    /// Language-server-like processes to proxy under `/lsp/<id>`.
    pub lsp_servers: Vec<LspServerDescriptor>,

    /// Caller-supplied layers, installed innermost in the given order.
    #[serde(skip)]
    pub extra_layers: Vec<LayerSpec>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: "/".to_string(),
            host: None,
            enable_auth: true,
            allow_origins: None,
            lsp_servers: Vec::new(),
            extra_layers: Vec::new(),
        }
    }
}

/// One auxiliary language-server-like process, running locally and owned
/// by someone else. Immutable once constructed.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LspServerDescriptor {
    /// Identifier; becomes the `/lsp/<id>` proxy prefix.
    pub id: String,

    /// Local port the process listens on.
    pub port: u16,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Whether to expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Address for the Prometheus exporter.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}
