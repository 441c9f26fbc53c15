//! Prometheus metrics for the service itself.
//!
//! This module provides:
//! - Check outcome counters
//! - Backend fetch latency
//! - Backend fetch failure counters

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use tracing::debug;

use crate::check::Outcome;

// === Metric Name Constants ===

/// Checks evaluated counter metric name.
pub const METRIC_CHECKS: &str = "umpire_checks_total";
/// Backend fetch latency metric name.
pub const METRIC_BACKEND_FETCH_LATENCY: &str = "umpire_backend_fetch_latency_ms";
/// Backend fetch failures counter metric name.
pub const METRIC_BACKEND_FETCH_FAILURES: &str = "umpire_backend_fetch_failures_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(METRIC_CHECKS, "Total number of checks evaluated, by outcome");
    describe_histogram!(
        METRIC_BACKEND_FETCH_LATENCY,
        "Metrics backend request latency in milliseconds"
    );
    describe_counter!(
        METRIC_BACKEND_FETCH_FAILURES,
        "Total number of failed backend requests, by kind"
    );

    debug!("Metrics initialized");
}

/// Install the Prometheus exporter listening on `addr`.
pub fn install_exporter(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()
}

/// Increment the checks counter for an outcome.
pub fn inc_checks(outcome: Outcome) {
    let label: &'static str = outcome.into();
    counter!(METRIC_CHECKS, "outcome" => label).increment(1);
}

/// Record backend fetch latency.
pub fn record_backend_fetch_latency(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_BACKEND_FETCH_LATENCY).record(latency_ms);
}

/// Increment the backend failures counter.
pub fn inc_backend_fetch_failures(kind: &'static str) {
    counter!(METRIC_BACKEND_FETCH_FAILURES, "kind" => kind).increment(1);
}
