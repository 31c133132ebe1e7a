//! Authentication and session handling.
//!
//! # Responsibilities
//! - Establish sessions from a per-process secret (session layer)
//! - Decide Authenticated vs Rejected for every request (auth layer)
//! - Guarantee downstream layers always find an [`Identity`] extension,
//!   whether or not authentication is enforced
//!
//! The concrete session cryptography stays behind this module's boundary;
//! the rest of the crate only sees [`AuthDecision`] and [`Identity`].

pub mod backend;
pub mod session;

pub use backend::{auth_middleware, AuthBackend};
pub use session::{session_middleware, session_token, Session, SESSION_COOKIE};

/// Who a request is acting as, attached as a request extension by the auth
/// layer. Present on every request that reaches the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub authenticated: bool,
}

impl Identity {
    /// Identity for requests when authentication is not enforced.
    pub fn anonymous() -> Self {
        Self {
            username: "anonymous".to_string(),
            authenticated: false,
        }
    }

    pub fn named(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            authenticated: true,
        }
    }
}

/// Outcome of the authentication decision for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Authenticated(Identity),
    Rejected(String),
}
