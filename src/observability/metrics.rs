//! Metrics collection and exposition.
//!
//! # Metrics
//! - `healthcheck_sync_reconcile_total` (counter): finished reconciliations by outcome
//! - `healthcheck_sync_reconcile_errors_total` (counter): failed reconciliations by error kind
//! - `healthcheck_sync_reconcile_duration_seconds` (histogram): successful reconcile latency
//! - `healthcheck_sync_retries_scheduled_total` (counter): re-scheduled reconciliations
//!
//! Recording is a no-op until a recorder is installed with [`init_metrics`].

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_reconcile(outcome: &'static str, start: Instant) {
    ::metrics::counter!("healthcheck_sync_reconcile_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("healthcheck_sync_reconcile_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

pub fn record_reconcile_error(kind: &'static str) {
    ::metrics::counter!("healthcheck_sync_reconcile_errors_total", "kind" => kind).increment(1);
}

pub fn record_retry_scheduled() {
    ::metrics::counter!("healthcheck_sync_retries_scheduled_total").increment(1);
}
