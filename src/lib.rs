//! Notebook gateway: middleware pipeline and local reverse-proxy front end.
//!
//! Assembles an ordered chain of cross-cutting HTTP layers (session,
//! auth, origin control, skew protection, observability) in front of an
//! application router, and reverse-proxies specific URL prefixes to
//! auxiliary local processes (interactive-figure backends, language
//! servers) with per-target path rewriting.

pub mod auth;
pub mod config;
pub mod error;
pub mod observability;
pub mod pipeline;
pub mod proxy;
pub mod security;
pub mod server;

pub use config::{GatewayConfig, LspServerDescriptor, PipelineConfig};
pub use error::GatewayError;
pub use pipeline::LayerSpec;
pub use server::GatewayServer;
