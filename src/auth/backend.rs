//! Authentication decision and its middleware.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::session::{self, Session};
use crate::auth::{AuthDecision, Identity};
use crate::error::GatewayError;

/// Decides whether a request counts as authenticated.
///
/// Installed on every chain, including when authentication is disabled: in
/// that mode every request resolves to an anonymous identity, so nothing
/// downstream has to special-case "no auth".
#[derive(Debug, Clone)]
pub struct AuthBackend {
    required: bool,
}

impl AuthBackend {
    pub fn new(required: bool) -> Self {
        Self { required }
    }

    pub fn authenticate(&self, req: &Request) -> AuthDecision {
        if !self.required {
            return AuthDecision::Authenticated(Identity::anonymous());
        }

        if let Some(session) = req.extensions().get::<Session>() {
            return AuthDecision::Authenticated(Identity::named(session.username.clone()));
        }

        // Bearer credential as a cookie-less alternative, e.g. for
        // programmatic clients.
        if let Some(value) = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(token) = value.strip_prefix("Bearer ") {
                if token == session::session_token() {
                    return AuthDecision::Authenticated(Identity::named("token"));
                }
            }
        }

        AuthDecision::Rejected("no valid session or bearer token".to_string())
    }
}

/// Auth layer: attaches the resolved [`Identity`] or rejects the request
/// with an authentication error, never a generic 500.
pub async fn auth_middleware(
    State(backend): State<AuthBackend>,
    mut req: Request,
    next: Next,
) -> Response {
    match backend.authenticate(&req) {
        AuthDecision::Authenticated(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        AuthDecision::Rejected(reason) => {
            GatewayError::AuthenticationRejected(reason).into_response()
        }
    }
}
