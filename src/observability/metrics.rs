//! Metrics collection and exposition.
//!
//! # Metrics
//! - `quiz_requests_total` (counter): requests by method, route, status
//! - `quiz_request_duration_seconds` (histogram): latency distribution
//! - `quiz_provider_calls_total` (counter): question service attempts by operation, outcome
//! - `quiz_provider_retries_total` (counter): retries by operation
//! - `quiz_fallbacks_total` (counter): degraded responses by operation
//! - `quiz_circuit_state` (gauge): 0=closed, 1=half-open, 2=open

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resilience::CircuitState;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "quiz_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "quiz_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_provider_call(operation: &'static str, outcome: &'static str) {
    counter!("quiz_provider_calls_total", "operation" => operation, "outcome" => outcome).increment(1);
}

pub fn record_retry(operation: &'static str) {
    counter!("quiz_provider_retries_total", "operation" => operation).increment(1);
}

pub fn record_fallback(operation: &'static str) {
    counter!("quiz_fallbacks_total", "operation" => operation).increment(1);
}

pub fn record_circuit_state(circuit: &str, state: CircuitState) {
    gauge!("quiz_circuit_state", "circuit" => circuit.to_string()).set(state.as_gauge());
}
