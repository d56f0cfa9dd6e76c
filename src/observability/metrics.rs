//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): proxied requests by method, status, mode
//! - `proxy_request_duration_seconds` (histogram): latency distribution
//!
//! # Design Decisions
//! - Low-overhead metric updates (recorded once per completed request)
//! - Labels for method, status code, and proxy mode
//! - Exposition via an optional Prometheus scrape listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics endpoint listening"),
        Err(error) => tracing::error!(error = %error, "failed to install metrics exporter"),
    }
}

/// Record the outcome of one proxied request.
pub fn record_request(method: &str, status: u16, mode: &'static str, start_time: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("mode", mode.to_string()),
    ];
    counter!("proxy_requests_total", &labels).increment(1);
    histogram!("proxy_request_duration_seconds", &labels)
        .record(start_time.elapsed().as_secs_f64());
}
