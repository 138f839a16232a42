//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Count handled requests per operation and outcome
//! - Time each request from receipt to reply
//! - Expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `hive_requests_total` (counter): requests by operation, outcome
//! - `hive_request_duration_seconds` (histogram): latency by operation
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Outcome separates upstream HTTP errors from code-less failures

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::fabric::Response;

/// Outcome label for a reply.
pub fn outcome_label(response: &Response) -> &'static str {
    match response {
        Response::Success { .. } => "success",
        Response::Error { error_code: Some(_), .. } => "upstream_error",
        Response::Error { error_code: None, .. } => "failure",
    }
}

/// Record one handled request.
pub fn record_request(operation: &'static str, response: &Response, start: Instant) {
    metrics::counter!(
        "hive_requests_total",
        "operation" => operation,
        "outcome" => outcome_label(response)
    )
    .increment(1);
    metrics::histogram!("hive_request_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}
