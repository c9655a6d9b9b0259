//! Metrics collection and exposition.
//!
//! # Metrics
//! - `discovery_polls_total` (counter): ticks by service, outcome
//! - `discovery_errors_total` (counter): failed polls by service, kind
//! - `discovery_reconfigurations_total` (counter): change signals by service
//! - `discovery_backends` (gauge): published backend count by service
//! - `discovery_malformed_endpoints_total` (counter): skipped tag values

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_poll(service: &str, outcome: &'static str) {
    counter!(
        "discovery_polls_total",
        "service" => service.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_discovery_error(service: &str, kind: &'static str) {
    counter!(
        "discovery_errors_total",
        "service" => service.to_string(),
        "kind" => kind
    )
    .increment(1);
}

pub fn record_reconfiguration(service: &str) {
    counter!("discovery_reconfigurations_total", "service" => service.to_string()).increment(1);
}

pub fn record_backend_count(service: &str, count: usize) {
    gauge!("discovery_backends", "service" => service.to_string()).set(count as f64);
}

pub fn record_malformed_endpoint(service: &str) {
    counter!("discovery_malformed_endpoints_total", "service" => service.to_string()).increment(1);
}
