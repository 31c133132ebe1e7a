//! Request forwarding to local upstream processes.
//!
//! # Responsibilities
//! - Intercept requests matching a rule's prefix; pass the rest through
//! - Replay method, headers and body against the resolved target
//! - Stream the upstream response back without buffering it
//!
//! # Design Decisions
//! - One shared hyper-util client; connections are scoped to the
//!   forwarded request and closed on every exit path. Dropping the
//!   response future (client disconnect) tears the upstream stream down.
//! - Upstreams are trusted local peers: plain HTTP, no credentials added.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{
        header,
        uri::{Authority, PathAndQuery, Scheme, Uri},
        HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::error::GatewayError;
use crate::observability::metrics;
use crate::proxy::rule::ProxyRule;

pub type ProxyClient = Client<HttpConnector, Body>;

/// Build the shared upstream client.
pub fn proxy_client() -> ProxyClient {
    Client::builder(TokioExecutor::new()).build(HttpConnector::new())
}

/// Per-rule state handed to the proxy middleware.
#[derive(Clone)]
pub struct ProxyState {
    pub rule: Arc<ProxyRule>,
    pub client: ProxyClient,
}

/// Reverse proxy layer. Prefix miss defers to the next layer; prefix hit
/// terminates the chain with the forwarded response.
pub async fn proxy_middleware(
    State(state): State<ProxyState>,
    req: Request,
    next: Next,
) -> Response {
    if !state.rule.matches(req.uri().path()) {
        return next.run(req).await;
    }
    match forward(&state, req).await {
        Ok(response) => response,
        Err(err) => {
            metrics::record_proxy(state.rule.prefix(), "error");
            err.into_response()
        }
    }
}

async fn forward(state: &ProxyState, req: Request) -> Result<Response, GatewayError> {
    let target = state.rule.resolve(req.uri().path())?;
    let started = Instant::now();

    let (mut parts, body) = req.into_parts();

    let path_and_query = match parts.uri.query() {
        Some(query) => format!("{}?{query}", target.path),
        None => target.path.clone(),
    };
    let path_and_query: PathAndQuery = path_and_query
        .parse()
        .map_err(|e| GatewayError::Internal(format!("rewritten path did not parse: {e}")))?;
    let authority: Authority = target
        .authority
        .parse()
        .map_err(|e| GatewayError::Internal(format!("upstream authority did not parse: {e}")))?;

    let mut uri_parts = parts.uri.into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(authority);
    uri_parts.path_and_query = Some(path_and_query);
    parts.uri = Uri::from_parts(uri_parts)
        .map_err(|e| GatewayError::Internal(format!("upstream uri did not assemble: {e}")))?;

    // The Host header must name the upstream, not this gateway.
    if let Ok(host) = HeaderValue::from_str(&target.authority) {
        parts.headers.insert(header::HOST, host);
    }

    tracing::debug!(
        prefix = %state.rule.prefix(),
        authority = %target.authority,
        path = %target.path,
        "forwarding to upstream"
    );

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            metrics::record_proxy(state.rule.prefix(), "ok");
            tracing::trace!(
                status = %response.status(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "upstream responded"
            );
            let (parts, body) = response.into_parts();
            // Body::new keeps the upstream stream lazy; nothing is buffered.
            Ok(Response::from_parts(parts, Body::new(body)))
        }
        Err(e) => Err(GatewayError::ProxyUpstreamUnavailable(format!(
            "{}: {e}",
            target.authority
        ))),
    }
}
