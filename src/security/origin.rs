//! Origin allow-list enforcement and CORS headers.
//!
//! # Responsibilities
//! - Derive the effective allow-list when none is configured
//! - Answer preflight requests; reject them for disallowed origins
//! - Attach CORS headers (credentials included) for allowed origins
//!
//! # Design Decisions
//! - Allow-list entries are host names, matched against the `Origin`
//!   header's host; scheme and port do not participate
//! - Same-origin and no-origin requests pass untouched
//! - Disallowed non-preflight requests are NOT blocked here: they simply
//!   get no CORS headers, which denies cross-origin script access while
//!   leaving routing unchanged

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use url::Url;

use crate::error::GatewayError;

/// Immutable origin policy shared by all in-flight requests.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allow: Arc<BTreeSet<String>>,
}

impl OriginPolicy {
    pub fn new(allow: BTreeSet<String>) -> Self {
        Self {
            allow: Arc::new(allow),
        }
    }

    /// Whether the given `Origin` header value is allow-listed.
    pub fn allows(&self, origin: &str) -> bool {
        match origin_host(origin) {
            Some(host) => self.allow.contains(&host),
            None => false,
        }
    }

    pub fn allow_list(&self) -> &BTreeSet<String> {
        &self.allow
    }
}

/// Compute the allow-list the chain will enforce.
///
/// When nothing is configured the default is local-only plus the public
/// host, never a wildcard.
pub fn effective_allow_origins(
    allow_origins: Option<BTreeSet<String>>,
    host: Option<&str>,
) -> BTreeSet<String> {
    match allow_origins {
        Some(set) => set,
        None => {
            let mut set: BTreeSet<String> =
                ["localhost".to_string(), "127.0.0.1".to_string()].into();
            if let Some(host) = host {
                set.insert(host.to_string());
            }
            set
        }
    }
}

fn origin_host(origin: &str) -> Option<String> {
    Url::parse(origin)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
}

fn request_host(headers: &HeaderMap) -> Option<String> {
    let host = headers.get(header::HOST)?.to_str().ok()?;
    // Strip a port suffix, careful not to mangle IPv6 literals.
    let stripped = match host.rsplit_once(':') {
        Some((h, p)) if p.chars().all(|c| c.is_ascii_digit()) => h,
        _ => host,
    };
    Some(stripped.trim_matches(|c| c == '[' || c == ']').to_string())
}

/// Origin/CORS layer.
///
/// Purely a response-header / preflight decision; routing is never altered.
pub async fn origin_middleware(
    State(policy): State<OriginPolicy>,
    req: Request,
    next: Next,
) -> Response {
    let Some(origin) = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
    else {
        return next.run(req).await;
    };

    let same_origin = match (origin_host(&origin), request_host(req.headers())) {
        (Some(o), Some(h)) => o == h,
        _ => false,
    };
    if same_origin {
        return next.run(req).await;
    }

    let allowed = policy.allows(&origin);
    let preflight = req.method() == Method::OPTIONS
        && req
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);

    if preflight {
        if !allowed {
            return GatewayError::OriginRejected(origin).into_response();
        }
        return preflight_response(&origin, req.headers());
    }

    let mut res = next.run(req).await;
    if allowed {
        apply_cors_headers(res.headers_mut(), &origin);
    }
    res
}

/// Answer an allowed preflight: mirror whatever method and headers the
/// client asked for. All methods and headers are allowed for allowed
/// origins.
fn preflight_response(origin: &str, req_headers: &HeaderMap) -> Response {
    let mut res = StatusCode::NO_CONTENT.into_response();
    apply_cors_headers(res.headers_mut(), origin);
    if let Some(method) = req_headers.get(header::ACCESS_CONTROL_REQUEST_METHOD) {
        res.headers_mut()
            .insert(header::ACCESS_CONTROL_ALLOW_METHODS, method.clone());
    }
    if let Some(headers) = req_headers.get(header::ACCESS_CONTROL_REQUEST_HEADERS) {
        res.headers_mut()
            .insert(header::ACCESS_CONTROL_ALLOW_HEADERS, headers.clone());
    }
    res.headers_mut().insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static("600"),
    );
    res
}

fn apply_cors_headers(headers: &mut HeaderMap, origin: &str) {
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.append(header::VARY, HeaderValue::from_static("origin"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allow_list_without_host() {
        let allow = effective_allow_origins(None, None);
        assert_eq!(allow.len(), 2);
        assert!(allow.contains("localhost"));
        assert!(allow.contains("127.0.0.1"));
    }

    #[test]
    fn test_default_allow_list_with_host() {
        let allow = effective_allow_origins(None, Some("notebook.example.com"));
        assert_eq!(allow.len(), 3);
        assert!(allow.contains("notebook.example.com"));
    }

    #[test]
    fn test_explicit_allow_list_wins() {
        let explicit: BTreeSet<String> = ["only.example.com".to_string()].into();
        let allow = effective_allow_origins(Some(explicit), Some("ignored.example.com"));
        assert_eq!(allow.len(), 1);
        assert!(!allow.contains("localhost"));
    }

    #[test]
    fn test_policy_matches_on_host_only() {
        let policy = OriginPolicy::new(effective_allow_origins(None, None));
        assert!(policy.allows("http://localhost:2718"));
        assert!(policy.allows("https://127.0.0.1"));
        assert!(!policy.allows("http://evil.example.com"));
        assert!(!policy.allows("not a url"));
    }

    #[test]
    fn test_request_host_strips_port() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:2718"));
        assert_eq!(request_host(&headers).as_deref(), Some("localhost"));

        headers.insert(header::HOST, HeaderValue::from_static("[::1]:2718"));
        assert_eq!(request_host(&headers).as_deref(), Some("::1"));
    }
}
