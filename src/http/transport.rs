//! HTTP client construction and per-request authentication.

// std
use std::fmt::{Debug, Formatter, Result as FmtResult};
// crates.io
use http::{HeaderName, HeaderValue, StatusCode};
use reqwest::{Client, Identity, RequestBuilder};
use serde::Deserialize;
use tokio::sync::Mutex;
// self
use crate::{
	_prelude::*,
	config::{Authentication, OAuth2Credentials},
};

/// Tokens are refreshed this long before the issuer says they expire.
pub const TOKEN_EXPIRY_DELTA: Duration = Duration::from_secs(10);

/// Pooled HTTP client plus the authentication applied to each request.
#[derive(Debug)]
pub struct Transport {
	client: Client,
	authenticator: Authenticator,
}
impl Transport {
	/// Build the transport for one provider instance.
	///
	/// Malformed TLS material fails here, before any request is attempted.
	pub fn configure(authentication: Option<&Authentication>) -> Result<Self> {
		let mut builder = Client::builder()
			.user_agent(format!("hydra-provider/{}", env!("CARGO_PKG_VERSION")))
			.connect_timeout(Duration::from_secs(30))
			.pool_idle_timeout(Duration::from_secs(90))
			.tcp_keepalive(Duration::from_secs(30));

		if let Some(Authentication::Tls { certificate, key, insecure_skip_verify }) = authentication
		{
			builder = builder
				.identity(client_identity(certificate, key)?)
				.danger_accept_invalid_certs(*insecure_skip_verify);
		}

		let client = builder.build()?;
		let authenticator = match authentication {
			None | Some(Authentication::Tls { .. }) => Authenticator::None,
			Some(Authentication::Basic { username, password }) =>
				Authenticator::Basic { username: username.clone(), password: password.clone() },
			Some(Authentication::HttpHeader { name, value }) => header_authenticator(name, value)?,
			Some(Authentication::OAuth2(credentials)) =>
				Authenticator::OAuth2(TokenSource::new(client.clone(), credentials.clone())),
		};

		Ok(Self { client, authenticator })
	}

	/// Underlying pooled client.
	pub fn client(&self) -> &Client {
		&self.client
	}

	/// Decorate a request with the configured credentials.
	pub async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
		match &self.authenticator {
			Authenticator::None => Ok(request),
			Authenticator::Basic { username, password } =>
				Ok(request.basic_auth(username, Some(password))),
			Authenticator::Header { name, value } =>
				Ok(request.header(name.clone(), value.clone())),
			Authenticator::OAuth2(source) => Ok(request.bearer_auth(source.token().await?)),
		}
	}
}

enum Authenticator {
	None,
	Basic { username: String, password: String },
	Header { name: HeaderName, value: HeaderValue },
	OAuth2(TokenSource),
}
impl Debug for Authenticator {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		match self {
			Self::None => f.write_str("None"),
			Self::Basic { username, .. } =>
				f.debug_struct("Basic").field("username", username).finish_non_exhaustive(),
			Self::Header { name, .. } =>
				f.debug_struct("Header").field("name", name).finish_non_exhaustive(),
			Self::OAuth2(source) => f.debug_tuple("OAuth2").field(source).finish(),
		}
	}
}

/// Client-credentials token source that reuses a token until shortly before it expires.
pub struct TokenSource {
	client: Client,
	credentials: OAuth2Credentials,
	cached: Mutex<Option<CachedToken>>,
}
impl TokenSource {
	/// Create a token source fetching through `client`.
	pub fn new(client: Client, credentials: OAuth2Credentials) -> Self {
		Self { client, credentials, cached: Mutex::new(None) }
	}

	/// Current access token, fetching a new one when the cached token is about to expire.
	pub async fn token(&self) -> Result<String> {
		let mut cached = self.cached.lock().await;

		if let Some(token) = cached.as_ref().filter(|token| token.is_fresh(Instant::now())) {
			return Ok(token.access_token.clone());
		}

		let token = self.fetch().await?;
		let access_token = token.access_token.clone();

		*cached = Some(token);

		Ok(access_token)
	}

	async fn fetch(&self) -> Result<CachedToken> {
		let credentials = &self.credentials;
		let mut form = vec![
			("grant_type", "client_credentials".to_owned()),
			("client_id", credentials.client_id.clone()),
			("client_secret", credentials.client_secret.clone()),
		];

		if !credentials.scopes.is_empty() {
			form.push(("scope", credentials.scopes.join(" ")));
		}
		if !credentials.audience.is_empty() {
			form.push(("audience", credentials.audience.join(" ")));
		}

		let requested_at = Instant::now();
		let response =
			self.client.post(credentials.token_endpoint.clone()).form(&form).send().await?;
		let status = response.status();

		if !status.is_success() {
			let body = response.text().await.ok();

			tracing::debug!(
				%status,
				endpoint = %credentials.token_endpoint,
				"token request rejected"
			);

			return Err(Error::Token { status, body });
		}

		let payload = response.json::<TokenResponse>().await?;

		if payload.access_token.is_empty() {
			return Err(Error::Token { status: StatusCode::BAD_GATEWAY, body: None });
		}

		tracing::debug!(
			endpoint = %credentials.token_endpoint,
			expires_in = ?payload.expires_in,
			"access token issued"
		);

		Ok(CachedToken {
			access_token: payload.access_token,
			expires_at: payload.expires_in.map(|secs| requested_at + Duration::from_secs(secs)),
		})
	}
}
impl Debug for TokenSource {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("TokenSource")
			.field("credentials", &self.credentials)
			.finish_non_exhaustive()
	}
}

struct CachedToken {
	access_token: String,
	expires_at: Option<Instant>,
}
impl CachedToken {
	fn is_fresh(&self, now: Instant) -> bool {
		match self.expires_at {
			Some(expires_at) => now + TOKEN_EXPIRY_DELTA < expires_at,
			None => true,
		}
	}
}

#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
	#[serde(default)]
	expires_in: Option<u64>,
}

fn client_identity(certificate: &str, key: &str) -> Result<Identity> {
	let mut pem = Vec::with_capacity(certificate.len() + key.len() + 1);

	pem.extend_from_slice(certificate.trim_end().as_bytes());
	pem.push(b'\n');
	pem.extend_from_slice(key.as_bytes());

	Identity::from_pem(&pem).map_err(|err| Error::Tls(err.to_string()))
}

fn header_authenticator(name: &str, value: &str) -> Result<Authenticator> {
	let name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
		Error::validation("authentication.http_header.name", format!("Invalid header name: {err}."))
	})?;
	let mut value = HeaderValue::from_str(value).map_err(|err| {
		Error::validation(
			"authentication.http_header.value",
			format!("Invalid header value: {err}."),
		)
	})?;

	value.set_sensitive(true);

	Ok(Authenticator::Header { name, value })
}
