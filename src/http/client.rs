//! Typed calls against the Hydra admin API.

// crates.io
use http::{Method, header::ACCEPT};
use serde::de::DeserializeOwned;
use url::Url;
// self
use crate::{
	_prelude::*,
	config::ProviderConfig,
	http::{
		retry::{self, BackoffPolicy},
		transport::Transport,
	},
	metrics,
	model::{CreateJsonWebKeySet, ErrorBody, JsonWebKeySet, OAuth2Client},
};

/// Admin API client shared by every reconciler of a provider instance.
#[derive(Debug)]
pub struct AdminClient {
	endpoint: Url,
	transport: Transport,
	retry: Option<BackoffPolicy>,
}
impl AdminClient {
	/// Build a client from resolved provider configuration.
	pub fn new(config: &ProviderConfig) -> Result<Self> {
		let transport = Transport::configure(config.authentication.as_ref())?;

		if config.endpoint.cannot_be_a_base() {
			return Err(Error::validation("endpoint", "Must be a hierarchical http(s) URL."));
		}

		Ok(Self { endpoint: config.endpoint.clone(), transport, retry: config.retry.clone() })
	}

	/// Base URL of the admin API.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	/// Backoff policy applied to throttled calls.
	pub fn retry_policy(&self) -> Option<&BackoffPolicy> {
		self.retry.as_ref()
	}

	/// `POST /admin/clients`.
	///
	/// When the response names a `client_id` but cannot be decoded, the error carries that id
	/// so the caller can keep tracking the remote client.
	pub async fn create_oauth2_client(&self, client: &OAuth2Client) -> Result<OAuth2Client> {
		let url = self.url(&["admin", "clients"])?;
		let body = serde_json::to_value(client)?;
		let raw = self.execute("create_oauth2_client", Method::POST, &url, Some(&body)).await?;
		let value = serde_json::from_str::<serde_json::Value>(&raw)?;
		let client_id =
			value.get("client_id").and_then(serde_json::Value::as_str).map(ToOwned::to_owned);

		serde_json::from_value(value).map_err(|err| match client_id {
			Some(id) => Error::partial_write(id, err.into()),
			None => err.into(),
		})
	}

	/// `GET /admin/clients/{id}`.
	pub async fn get_oauth2_client(&self, id: &str) -> Result<OAuth2Client> {
		let url = self.url(&["admin", "clients", id])?;

		self.call("get_oauth2_client", Method::GET, &url, None).await
	}

	/// `PUT /admin/clients/{id}`; a full replace of the stored client.
	pub async fn set_oauth2_client(&self, id: &str, client: &OAuth2Client) -> Result<OAuth2Client> {
		let url = self.url(&["admin", "clients", id])?;
		let body = serde_json::to_value(client)?;

		self.call("set_oauth2_client", Method::PUT, &url, Some(&body)).await
	}

	/// `DELETE /admin/clients/{id}`.
	pub async fn delete_oauth2_client(&self, id: &str) -> Result<()> {
		let url = self.url(&["admin", "clients", id])?;

		self.execute("delete_oauth2_client", Method::DELETE, &url, None).await.map(|_| ())
	}

	/// `POST /admin/keys/{set}`; Hydra generates the key material.
	pub async fn create_json_web_key_set(
		&self,
		set: &str,
		request: &CreateJsonWebKeySet,
	) -> Result<JsonWebKeySet> {
		let url = self.url(&["admin", "keys", set])?;
		let body = serde_json::to_value(request)?;

		self.call("create_json_web_key_set", Method::POST, &url, Some(&body)).await
	}

	/// `GET /admin/keys/{set}`.
	pub async fn get_json_web_key_set(&self, set: &str) -> Result<JsonWebKeySet> {
		let url = self.url(&["admin", "keys", set])?;

		self.call("get_json_web_key_set", Method::GET, &url, None).await
	}

	/// `PUT /admin/keys/{set}`; stores the given keys as-is.
	pub async fn set_json_web_key_set(
		&self,
		set: &str,
		keys: &JsonWebKeySet,
	) -> Result<JsonWebKeySet> {
		let url = self.url(&["admin", "keys", set])?;
		let body = serde_json::to_value(keys)?;

		self.call("set_json_web_key_set", Method::PUT, &url, Some(&body)).await
	}

	/// `DELETE /admin/keys/{set}`.
	pub async fn delete_json_web_key_set(&self, set: &str) -> Result<()> {
		let url = self.url(&["admin", "keys", set])?;

		self.execute("delete_json_web_key_set", Method::DELETE, &url, None).await.map(|_| ())
	}

	fn url(&self, segments: &[&str]) -> Result<Url> {
		let mut url = self.endpoint.clone();

		url.path_segments_mut()
			.map_err(|_| Error::validation("endpoint", "Must be a hierarchical http(s) URL."))?
			.pop_if_empty()
			.extend(segments);

		Ok(url)
	}

	async fn call<T>(
		&self,
		operation: &'static str,
		method: Method,
		url: &Url,
		body: Option<&serde_json::Value>,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let raw = self.execute(operation, method, url, body).await?;

		Ok(serde_json::from_str(&raw)?)
	}

	async fn execute(
		&self,
		operation: &'static str,
		method: Method,
		url: &Url,
		body: Option<&serde_json::Value>,
	) -> Result<String> {
		retry::retry_throttled(operation, self.retry.as_ref(), || {
			self.attempt(operation, method.clone(), url, body)
		})
		.await
	}

	async fn attempt(
		&self,
		operation: &'static str,
		method: Method,
		url: &Url,
		body: Option<&serde_json::Value>,
	) -> Result<String> {
		let mut request = self
			.transport
			.client()
			.request(method.clone(), url.clone())
			.header(ACCEPT, "application/json");

		if let Some(body) = body {
			request = request.json(body);
		}

		let request = self.transport.authorize(request).await?;
		let started = Instant::now();
		let response = match request.send().await {
			Ok(response) => response,
			Err(err) => {
				metrics::record_request(operation, "error", started.elapsed());

				return Err(err.into());
			},
		};
		let status = response.status();
		let elapsed = started.elapsed();

		metrics::record_request(operation, status.as_str(), elapsed);
		tracing::debug!(
			operation,
			method = %method,
			path = url.path(),
			status = %status,
			elapsed = ?elapsed,
			"admin api call complete"
		);

		if !status.is_success() {
			let body = response.text().await.ok();

			if let Some(detail) =
				body.as_deref().and_then(|raw| serde_json::from_str::<ErrorBody>(raw).ok())
			{
				tracing::debug!(
					operation,
					error = ?detail.error,
					description = ?detail.error_description,
					"admin api rejected the call"
				);
			}

			return Err(Error::HttpStatus { status, url: url.clone(), body });
		}

		Ok(response.text().await?)
	}
}
