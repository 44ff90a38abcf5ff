//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): proxied requests by method, status
//! - `proxy_request_duration_seconds` (histogram): upstream latency
//! - `markdown_responses_total` (counter): rewrite outcomes
//! - `markdown_render_duration_seconds` (histogram): render time
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exporter is optional (config `metrics_enabled`)

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one proxied request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    counter!("proxy_requests_total", "method" => method.clone(), "status" => status.clone())
        .increment(1);
    histogram!("proxy_request_duration_seconds", "method" => method, "status" => status)
        .record(start.elapsed().as_secs_f64());
}

/// Record what the markdown pipeline did with a response.
pub fn record_markdown_outcome(outcome: &'static str) {
    counter!("markdown_responses_total", "outcome" => outcome).increment(1);
}

/// Record time spent rendering markdown.
pub fn record_render_duration(start: Instant) {
    histogram!("markdown_render_duration_seconds").record(start.elapsed().as_secs_f64());
}
