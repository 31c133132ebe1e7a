//! Integration tests for chain behavior: auth, skew, CORS, base URL.

use reqwest::header::{HeaderValue, ACCESS_CONTROL_REQUEST_METHOD, COOKIE, ORIGIN};
use reqwest::StatusCode;

use notebook_gateway::auth::{session_token, SESSION_COOKIE};
use notebook_gateway::config::GatewayConfig;
use notebook_gateway::security::{server_token, SERVER_TOKEN_HEADER};

mod common;

fn no_auth_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.pipeline.enable_auth = false;
    config
}

#[tokio::test]
async fn test_auth_disabled_allows_anonymous_requests() {
    let gateway = common::start_gateway(no_auth_config()).await;

    // No cookie, no bearer token: still reaches the application.
    let res = common::client()
        .get(format!("http://{gateway}/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_auth_enabled_rejects_without_session() {
    let gateway = common::start_gateway(GatewayConfig::default()).await;

    let res = common::client()
        .get(format!("http://{gateway}/health"))
        .send()
        .await
        .unwrap();

    // An authentication error, never a generic 500.
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("authentication"));
}

#[tokio::test]
async fn test_auth_enabled_accepts_session_cookie() {
    let gateway = common::start_gateway(GatewayConfig::default()).await;

    let cookie = format!("{SESSION_COOKIE}={}", session_token());
    let res = common::client()
        .get(format!("http://{gateway}/health"))
        .header(COOKIE, HeaderValue::from_str(&cookie).unwrap())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_auth_enabled_accepts_bearer_token() {
    let gateway = common::start_gateway(GatewayConfig::default()).await;

    let res = common::client()
        .get(format!("http://{gateway}/health"))
        .bearer_auth(session_token())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_stale_session_cookie_is_rejected_not_500() {
    let gateway = common::start_gateway(GatewayConfig::default()).await;

    let cookie = format!("{SESSION_COOKIE}=stale-from-previous-process");
    let res = common::client()
        .get(format!("http://{gateway}/health"))
        .header(COOKIE, HeaderValue::from_str(&cookie).unwrap())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_skew_mismatch_requires_reload() {
    let gateway = common::start_gateway(no_auth_config()).await;

    let res = common::client()
        .get(format!("http://{gateway}/health"))
        .header(SERVER_TOKEN_HEADER, "token-from-older-build")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_skew_matching_marker_passes() {
    let gateway = common::start_gateway(no_auth_config()).await;

    let res = common::client()
        .get(format!("http://{gateway}/health"))
        .header(SERVER_TOKEN_HEADER, server_token())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_preflight_from_disallowed_origin_rejected() {
    let gateway = common::start_gateway(no_auth_config()).await;

    let res = common::client()
        .request(reqwest::Method::OPTIONS, format!("http://{gateway}/health"))
        .header(ORIGIN, "http://evil.example.com")
        .header(ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_preflight_from_allowed_origin_mirrors_request() {
    let gateway = common::start_gateway(no_auth_config()).await;

    // "localhost" is in the derived default allow-list.
    let res = common::client()
        .request(reqwest::Method::OPTIONS, format!("http://{gateway}/health"))
        .header(ORIGIN, "http://localhost:9999")
        .header(ACCESS_CONTROL_REQUEST_METHOD, "PUT")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let headers = res.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        "http://localhost:9999"
    );
    assert_eq!(headers.get("access-control-allow-credentials").unwrap(), "true");
    assert_eq!(headers.get("access-control-allow-methods").unwrap(), "PUT");
}

#[tokio::test]
async fn test_allowed_origin_gets_cors_headers_on_response() {
    let gateway = common::start_gateway(no_auth_config()).await;

    let res = common::client()
        .get(format!("http://{gateway}/health"))
        .header(ORIGIN, "http://localhost:9999")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:9999"
    );
}

#[tokio::test]
async fn test_disallowed_origin_gets_no_cors_headers_but_is_served() {
    let gateway = common::start_gateway(no_auth_config()).await;

    let res = common::client()
        .get(format!("http://{gateway}/health"))
        .header(ORIGIN, "http://evil.example.com")
        .send()
        .await
        .unwrap();

    // Routing unchanged; the browser denies script access itself.
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_app_routes_are_mounted_under_base_url() {
    let mut config = no_auth_config();
    config.pipeline.base_url = "/app".to_string();
    let gateway = common::start_gateway(config).await;
    let client = common::client();

    let res = client
        .get(format!("http://{gateway}/app/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("http://{gateway}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
