//! Version-skew protection.
//!
//! The server mints a build marker at startup. Clients that loaded the
//! frontend from this process echo it back on later requests; a marker
//! from a previous process means the client is running stale assets and
//! must reload. Distinct from an authentication failure.

use std::sync::LazyLock;

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::auth::session::cookie_value;
use crate::error::GatewayError;

/// Header (and cookie) name carrying the client's build marker.
pub const SERVER_TOKEN_HEADER: &str = "x-gateway-server-token";

static SERVER_TOKEN: LazyLock<String> = LazyLock::new(|| Uuid::new_v4().to_string());

/// This process's build marker.
pub fn server_token() -> &'static str {
    &SERVER_TOKEN
}

/// Skew-protection layer: rejects requests whose marker disagrees with
/// ours. Requests without a marker pass through; plain navigations never
/// carry one.
pub async fn skew_middleware(req: Request, next: Next) -> Response {
    let marker = req
        .headers()
        .get(SERVER_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .or_else(|| cookie_value(req.headers(), SERVER_TOKEN_HEADER));

    match marker {
        Some(marker) if marker != server_token() => GatewayError::SkewRejected.into_response(),
        _ => next.run(req).await,
    }
}
