//! Configuration subsystem.
//!
//! Configuration is built once per server start (from a TOML file, CLI
//! overrides, or code) and is immutable afterwards. Reconfiguring means
//! rebuilding the whole middleware chain from a fresh value.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::load_config;
pub use schema::{
    GatewayConfig, ListenerConfig, LspServerDescriptor, ObservabilityConfig, PipelineConfig,
    TimeoutConfig,
};
pub use validation::{normalize_base_url, validate_config};
