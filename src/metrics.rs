//! Admin API call telemetry.
//!
//! With the `metrics` feature enabled every remote call is counted through the `metrics` facade;
//! without it the hooks compile to nothing.

// std
#[cfg(feature = "prometheus")] use std::sync::OnceLock;
use std::time::Duration;
// crates.io
#[cfg(feature = "prometheus")]
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
// self
#[cfg(feature = "prometheus")] use crate::{Error, Result};

#[cfg(feature = "metrics")] const METRIC_REQUESTS_TOTAL: &str = "hydra_provider_requests_total";
#[cfg(feature = "metrics")]
const METRIC_REQUEST_DURATION: &str = "hydra_provider_request_duration_seconds";
#[cfg(feature = "metrics")] const METRIC_THROTTLED_TOTAL: &str = "hydra_provider_throttled_total";

/// Shared Prometheus handle installed by [`install_default_exporter`].
#[cfg(feature = "prometheus")]
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the default Prometheus recorder backed by `metrics`.
///
/// Multiple invocations are safe; subsequent calls become no-ops once the recorder is installed.
#[cfg(feature = "prometheus")]
pub fn install_default_exporter() -> Result<()> {
	if PROMETHEUS_HANDLE.get().is_some() {
		return Ok(());
	}

	let handle = PrometheusBuilder::new()
		.install_recorder()
		.map_err(|err| Error::Metrics(err.to_string()))?;
	let _ = PROMETHEUS_HANDLE.set(handle);

	Ok(())
}

/// Access the global Prometheus exporter handle when installed.
#[cfg(feature = "prometheus")]
pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
	PROMETHEUS_HANDLE.get()
}

/// Record one completed admin API call; `status` is the HTTP status or `"error"`.
#[cfg(feature = "metrics")]
pub fn record_request(operation: &'static str, status: &str, elapsed: Duration) {
	metrics::counter!(
		METRIC_REQUESTS_TOTAL,
		"operation" => operation,
		"status" => status.to_owned()
	)
	.increment(1);
	metrics::histogram!(METRIC_REQUEST_DURATION, "operation" => operation)
		.record(elapsed.as_secs_f64());
}

/// Record one completed admin API call; `status` is the HTTP status or `"error"`.
#[cfg(not(feature = "metrics"))]
pub fn record_request(_operation: &'static str, _status: &str, _elapsed: Duration) {}

/// Record a throttled (HTTP 429) response from the admin API.
#[cfg(feature = "metrics")]
pub fn record_throttled(operation: &'static str) {
	metrics::counter!(METRIC_THROTTLED_TOTAL, "operation" => operation).increment(1);
}

/// Record a throttled (HTTP 429) response from the admin API.
#[cfg(not(feature = "metrics"))]
pub fn record_throttled(_operation: &'static str) {}
