//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, outcome
//! - `proxy_request_duration_seconds` (histogram): latency by method, outcome
//! - `proxy_cache_hits_total` / `proxy_cache_misses_total` (counters)
//! - `proxy_cache_stores_total` (counter): responses written to the cache
//! - `proxy_cache_entries` (gauge): entries held by the in-memory cache,
//!   updated on every store and every sweep
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a completed proxy request.
pub fn record_request(method: &str, status: u16, outcome: &'static str, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();
    metrics::counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!(
        "proxy_request_duration_seconds",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .record(elapsed);
}

pub fn record_cache_hit() {
    metrics::counter!("proxy_cache_hits_total").increment(1);
}

pub fn record_cache_miss() {
    metrics::counter!("proxy_cache_misses_total").increment(1);
}

pub fn record_cache_store() {
    metrics::counter!("proxy_cache_stores_total").increment(1);
}

pub fn record_cache_size(entries: usize) {
    metrics::gauge!("proxy_cache_entries").set(entries as f64);
}
