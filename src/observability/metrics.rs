//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): relay responses by outcome, status
//! - `relay_request_duration_seconds` (histogram): latency by outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder (tests, function invocations) it costs nothing
//! - The Prometheus exporter runs its own listener when enabled

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::StatusCode;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one relay response.
pub fn record_relay(outcome: &'static str, status: StatusCode, start: Instant) {
    metrics::counter!(
        "relay_requests_total",
        "outcome" => outcome,
        "status" => status.as_u16().to_string()
    )
    .increment(1);
    metrics::histogram!("relay_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}
