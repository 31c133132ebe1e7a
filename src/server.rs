//! Gateway server: assembled chain in front of the application's routes.
//!
//! # Responsibilities
//! - Validate configuration and assemble the middleware chain
//! - Mount the application's route table under the base URL
//! - Bind and serve with graceful shutdown
//!
//! Assembly failures abort construction; nothing listens until the whole
//! chain is built.

use std::time::Duration;

use axum::{routing::get, Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;

use crate::config::{normalize_base_url, validate_config, GatewayConfig};
use crate::error::GatewayError;
use crate::pipeline::{assemble, install, LayerSpec};
use crate::proxy::proxy_client;
use crate::security::skew;

/// HTTP server hosting the assembled pipeline.
pub struct GatewayServer {
    router: Router,
}

impl GatewayServer {
    /// Build the chain from `config` and install it in front of `app`,
    /// the application's own route table.
    pub fn new(config: GatewayConfig, app: Router) -> Result<Self, GatewayError> {
        validate_config(&config)?;

        let GatewayConfig {
            pipeline, timeouts, ..
        } = config;

        let base_path = normalize_base_url(&pipeline.base_url)?;
        let app = if base_path == "/" {
            app
        } else {
            Router::new().nest(&base_path, app)
        };

        let chain = assemble(pipeline)?;
        tracing::debug!(
            layers = ?chain.iter().map(LayerSpec::name).collect::<Vec<_>>(),
            "installing middleware chain"
        );

        let client = proxy_client();
        let router = install(chain, app, &client)
            .layer(TimeoutLayer::new(Duration::from_secs(timeouts.request_secs)));

        Ok(Self { router })
    }

    /// Run the server on the given listener until shutdown.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "gateway listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("gateway stopped");
        Ok(())
    }
}

/// Default application router for the binary: the real route table is the
/// notebook application's concern, supplied by the embedding caller.
pub fn default_app() -> Router {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "server_token": skew::server_token(),
    }))
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
