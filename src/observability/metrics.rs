//! Metrics collection and exposition.
//!
//! # Metrics
//! - `selector_resolutions_total` (counter): URL lookups by `outcome`
//!   (`matched`, `not_found`, `ambiguous`)
//! - `selector_registered_templates` (gauge): templates in the active selector

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const RESOLUTIONS_TOTAL: &str = "selector_resolutions_total";
pub const REGISTERED_TEMPLATES: &str = "selector_registered_templates";

/// Install the Prometheus recorder with an HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe();
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

fn describe() {
    metrics::describe_counter!(RESOLUTIONS_TOTAL, "URL resolutions by outcome");
    metrics::describe_gauge!(REGISTERED_TEMPLATES, "URI templates in the active selector");
}

pub fn record_resolution(outcome: &'static str) {
    metrics::counter!(RESOLUTIONS_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_registered(count: usize) {
    metrics::gauge!(REGISTERED_TEMPLATES).set(count as f64);
}
