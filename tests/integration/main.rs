//! End-to-end reconciliation against a mocked Hydra admin API.

mod authentication;
mod jwks;
mod oauth2_client;

// std
use std::time::Duration;
// crates.io
use hydra_provider::{BackoffPolicy, Provider, ProviderConfig};
use url::Url;
use wiremock::MockServer;

pub(crate) fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_test_writer()
		.try_init();
}

pub(crate) fn config_for(server: &MockServer) -> ProviderConfig {
	ProviderConfig::new(Url::parse(&server.uri()).expect("mock server uri"))
}

pub(crate) fn provider_for(server: &MockServer) -> Provider {
	Provider::configure(config_for(server)).expect("provider")
}

pub(crate) fn fast_retry(max_elapsed_time: Duration) -> BackoffPolicy {
	BackoffPolicy {
		initial_interval: Duration::from_millis(10),
		max_interval: Duration::from_millis(50),
		max_elapsed_time,
		..Default::default()
	}
}
