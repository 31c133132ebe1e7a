//! The ordered middleware chain.
//!
//! A chain is an explicit `Vec<LayerSpec>`, outermost first, produced by a
//! pure assembly function from an immutable config. Nothing registers
//! itself globally: assembly is deterministic and testable on its own,
//! and installation is a separate, mechanical step.

pub mod assembler;

use std::fmt;
use std::sync::Arc;

use axum::{middleware, Router};
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::auth::{auth_middleware, session_middleware, AuthBackend};
use crate::error::handle_panic;
use crate::observability::metrics::track_requests;
use crate::proxy::{proxy_middleware, ProxyClient, ProxyRule, ProxyState};
use crate::security::{origin_middleware, skew_middleware, OriginPolicy};

pub use assembler::{assemble, install};

/// How caller-supplied layers are expressed: a function that wraps the
/// router at the spec's position in the chain.
pub type InstallFn = Box<dyn FnOnce(Router) -> Router + Send>;

/// One named middleware to install. Position in the chain (outermost
/// first) determines wrapping order; insertion order is significant.
pub enum LayerSpec {
    /// Session establishment from the per-process secret. Only present
    /// when authentication is enabled.
    Session,

    /// Tracing, request ids, metrics and the panic catch-all. Outermost of
    /// the always-on layers so it sees rejected requests too.
    Observability,

    /// Authentication decision. `required = false` still attaches an
    /// anonymous identity rather than skipping the layer.
    Auth { required: bool },

    /// Origin allow-list / CORS headers.
    Cors { policy: OriginPolicy },

    /// Build-marker skew protection.
    Skew,

    /// One reverse-proxy rule. Matching paths terminate here instead of
    /// reaching the application's route table.
    Proxy { rule: ProxyRule },

    /// Caller-supplied layer.
    Custom { name: String, install: InstallFn },
}

impl LayerSpec {
    /// Wrap an arbitrary tower layer as a named custom spec.
    pub fn custom<L>(name: impl Into<String>, layer: L) -> Self
    where
        L: tower::Layer<axum::routing::Route> + Clone + Send + Sync + 'static,
        L::Service: tower::Service<
                axum::extract::Request,
                Response = axum::response::Response,
                Error = std::convert::Infallible,
            > + Clone
            + Send
            + Sync
            + 'static,
        <L::Service as tower::Service<axum::extract::Request>>::Future: Send + 'static,
    {
        LayerSpec::Custom {
            name: name.into(),
            install: Box::new(move |router| router.layer(layer)),
        }
    }

    pub fn name(&self) -> String {
        match self {
            LayerSpec::Session => "session".to_string(),
            LayerSpec::Observability => "observability".to_string(),
            LayerSpec::Auth { .. } => "auth".to_string(),
            LayerSpec::Cors { .. } => "cors".to_string(),
            LayerSpec::Skew => "skew".to_string(),
            LayerSpec::Proxy { rule } => format!("proxy:{}", rule.prefix()),
            LayerSpec::Custom { name, .. } => format!("custom:{name}"),
        }
    }

    /// Install this layer onto the router. Because `Router::layer` wraps
    /// outside existing layers, the assembler applies specs in reverse.
    pub fn install(self, app: Router, client: &ProxyClient) -> Router {
        match self {
            LayerSpec::Session => app.layer(middleware::from_fn(session_middleware)),
            LayerSpec::Observability => app
                .layer(middleware::from_fn(track_requests))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http())
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(CatchPanicLayer::custom(handle_panic)),
            LayerSpec::Auth { required } => app.layer(middleware::from_fn_with_state(
                AuthBackend::new(required),
                auth_middleware,
            )),
            LayerSpec::Cors { policy } => {
                app.layer(middleware::from_fn_with_state(policy, origin_middleware))
            }
            LayerSpec::Skew => app.layer(middleware::from_fn(skew_middleware)),
            LayerSpec::Proxy { rule } => {
                let state = ProxyState {
                    rule: Arc::new(rule),
                    client: client.clone(),
                };
                app.layer(middleware::from_fn_with_state(state, proxy_middleware))
            }
            LayerSpec::Custom { install, .. } => install(app),
        }
    }
}

// Custom's closure has no useful representation, so Debug shows names only.
impl fmt::Debug for LayerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LayerSpec").field(&self.name()).finish()
    }
}
