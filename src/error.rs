//! Error taxonomy and the single error-to-response funnel.
//!
//! # Responsibilities
//! - Classify every failure the gateway can produce
//! - Map per-request errors to structured, user-safe responses
//! - Keep configuration errors fatal at startup, never per-request
//!
//! # Design Decisions
//! - One enum for the whole crate; callers match on variants, not strings
//! - Responses are JSON `{"detail": ...}` with an appropriate status code
//! - Raw panic payloads are logged but never sent to the client

use std::any::Any;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use http_body_util::Full;
use serde_json::json;
use thiserror::Error;

/// All failure modes of the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Assembly-time misconfiguration. Fatal: aborts startup before any
    /// request is served.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Authentication was required and no valid credential was presented.
    #[error("authentication failed: {0}")]
    AuthenticationRejected(String),

    /// The client's build marker disagrees with this server's; the client
    /// must reload to pick up matching assets.
    #[error("server token mismatch; reload the page")]
    SkewRejected,

    /// Cross-origin request from an origin outside the allow-list.
    #[error("origin not allowed: {0}")]
    OriginRejected(String),

    /// A proxy path that should encode its own target did not parse.
    #[error("malformed proxy path: {0}")]
    ProxyTargetMalformed(String),

    /// The upstream process behind a proxy rule could not be reached.
    #[error("upstream unavailable: {0}")]
    ProxyUpstreamUnavailable(String),

    /// Catch-all. Logged server-side; the client sees a generic message.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Status code the error maps to at the chain boundary.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::AuthenticationRejected(_) => StatusCode::UNAUTHORIZED,
            GatewayError::SkewRejected => StatusCode::CONFLICT,
            GatewayError::OriginRejected(_) => StatusCode::FORBIDDEN,
            GatewayError::ProxyTargetMalformed(_) => StatusCode::BAD_REQUEST,
            GatewayError::ProxyUpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "request rejected");
        }
        let detail = match &self {
            // Never leak internal detail for 5xx catch-alls.
            GatewayError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Handler for `CatchPanicLayer`: converts a panic anywhere in the chain
/// into a generic 500 without leaking the payload.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> axum::http::Response<Full<Bytes>> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "non-string panic payload".to_string()
    };
    tracing::error!(panic = %detail, "request handler panicked");

    let body = json!({ "detail": "internal server error" }).to_string();
    axum::http::Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}
