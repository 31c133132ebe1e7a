//! Session establishment against a per-process secret.
//!
//! The secret is generated once at process start and never rotates while
//! the server lives. Restarting the server therefore invalidates every
//! outstanding session cookie at once.

use std::sync::LazyLock;

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use rand::RngCore;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "gateway_session";

// 32 random bytes, hex-encoded. Process-wide immutable state.
static SESSION_SECRET: LazyLock<String> = LazyLock::new(|| {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
});

/// Token a valid session cookie must carry for the life of this process.
pub fn session_token() -> &'static str {
    &SESSION_SECRET
}

/// A validated session, attached as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
}

/// Extract a single cookie value from the `Cookie` header.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    for cookie in cookies.split(';') {
        if let Some(value) = cookie.trim().strip_prefix(name) {
            if let Some(value) = value.strip_prefix('=') {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Session layer: validates the session cookie and attaches a [`Session`]
/// extension. Never rejects; turning a missing session into a response is
/// the auth layer's job.
pub async fn session_middleware(mut req: Request, next: Next) -> Response {
    if let Some(token) = cookie_value(req.headers(), SESSION_COOKIE) {
        if token == session_token() {
            req.extensions_mut().insert(Session {
                username: "user".to_string(),
            });
        } else {
            tracing::debug!("session cookie present but stale");
        }
    }
    next.run(req).await
}
