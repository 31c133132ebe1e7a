//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method and status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_proxy_requests_total` (counter): forwarded requests by
//!   proxy prefix and outcome

use std::net::SocketAddr;
use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "failed to install metrics exporter"),
    }
}

/// Record one finished request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    metrics::histogram!(
        "gateway_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status.to_string(),
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one proxied request per rule prefix.
pub fn record_proxy(prefix: &str, outcome: &'static str) {
    metrics::counter!(
        "gateway_proxy_requests_total",
        "prefix" => prefix.to_string(),
        "outcome" => outcome,
    )
    .increment(1);
}

/// Middleware recording every request's outcome, including rejections
/// produced further down the chain.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let response = next.run(req).await;
    record_request(&method, response.status().as_u16(), start);
    response
}
