//! Provider instance: configured once, shared by every reconciler call.

// self
use crate::{
	_prelude::*,
	config::ProviderConfig,
	http::client::AdminClient,
	resource::{JwksDataSource, JwksReconciler, OAuth2ClientReconciler},
};

/// Configured provider handle.
///
/// Holds the one HTTP client and backoff policy of the instance; cloning is cheap and clones share
/// the connection pool.
#[derive(Clone, Debug)]
pub struct Provider {
	client: Arc<AdminClient>,
}
impl Provider {
	/// Build the provider from resolved configuration.
	#[tracing::instrument(skip_all, fields(endpoint = %config.endpoint))]
	pub fn configure(config: ProviderConfig) -> Result<Self> {
		let client = AdminClient::new(&config)?;

		tracing::debug!(
			authentication = ?config.authentication,
			retry = config.retry.is_some(),
			"provider configured"
		);

		Ok(Self { client: Arc::new(client) })
	}

	/// Resolve the host's provider block and configure from it.
	pub fn from_attributes(attributes: serde_json::Value) -> Result<Self> {
		Self::configure(ProviderConfig::from_attributes(attributes)?)
	}

	/// Shared admin API client.
	pub fn admin_client(&self) -> &AdminClient {
		&self.client
	}

	/// Reconciler for `hydra_oauth2_client`.
	pub fn oauth2_clients(&self) -> OAuth2ClientReconciler {
		OAuth2ClientReconciler::new(self.client.clone())
	}

	/// Reconciler for `hydra_jwks`.
	pub fn jwks(&self) -> JwksReconciler {
		JwksReconciler::new(self.client.clone())
	}

	/// The read-only `hydra_jwks` data source.
	pub fn jwks_data_source(&self) -> JwksDataSource {
		JwksDataSource::new(self.client.clone())
	}
}
