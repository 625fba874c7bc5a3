//! Provider block resolution.
//!
//! The host hands over the provider block as an attribute bag. It is deserialised into raw block
//! structs, topped up from `HYDRA_ADMIN_*` environment variables where an attribute is absent,
//! and resolved into a [`ProviderConfig`] whose authentication is a single tagged variant.

// std
use std::fmt::{Debug, Formatter, Result as FmtResult};
// crates.io
use serde::Deserialize;
use url::Url;
// self
use crate::{
	_prelude::*,
	http::retry::{
		BackoffPolicy, DEFAULT_MAX_ELAPSED_TIME, DEFAULT_MAX_INTERVAL, DEFAULT_RANDOMIZATION_FACTOR,
	},
};

/// Environment variable overriding the admin API endpoint.
pub const ENV_ENDPOINT: &str = "HYDRA_ADMIN_URL";
/// Environment variable supplying the basic auth username.
pub const ENV_BASIC_USERNAME: &str = "HYDRA_ADMIN_BASIC_AUTH_USERNAME";
/// Environment variable supplying the basic auth password.
pub const ENV_BASIC_PASSWORD: &str = "HYDRA_ADMIN_BASIC_AUTH_PASSWORD";
/// Environment variable supplying the authentication header name.
pub const ENV_HEADER_NAME: &str = "HYDRA_ADMIN_AUTH_HTTP_HEADER_NAME";
/// Environment variable supplying the authentication header value.
pub const ENV_HEADER_VALUE: &str = "HYDRA_ADMIN_AUTH_HTTP_HEADER_VALUE";
/// Environment variable supplying the OAuth2 token endpoint.
pub const ENV_OAUTH2_TOKEN_ENDPOINT: &str = "HYDRA_ADMIN_OAUTH2_TOKEN_ENDPOINT";
/// Environment variable supplying the OAuth2 client id.
pub const ENV_OAUTH2_CLIENT_ID: &str = "HYDRA_ADMIN_OAUTH2_CLIENT_ID";
/// Environment variable supplying the OAuth2 client secret.
pub const ENV_OAUTH2_CLIENT_SECRET: &str = "HYDRA_ADMIN_OAUTH2_CLIENT_SECRET";
/// Environment variable supplying the OAuth2 audience list.
pub const ENV_OAUTH2_AUDIENCE: &str = "HYDRA_ADMIN_OAUTH2_AUDIENCE";
/// Environment variable supplying the OAuth2 scope list.
pub const ENV_OAUTH2_SCOPES: &str = "HYDRA_ADMIN_OAUTH2_SCOPES";
/// Environment variable toggling server certificate verification.
pub const ENV_TLS_INSECURE: &str = "HYDRA_ADMIN_TLS_AUTH_INSECURE";
/// Environment variable supplying the PEM client certificate.
pub const ENV_TLS_CERT_DATA: &str = "HYDRA_ADMIN_TLS_AUTH_CERT_DATA";
/// Environment variable supplying the PEM client key.
pub const ENV_TLS_KEY_DATA: &str = "HYDRA_ADMIN_TLS_AUTH_KEY_DATA";

const DEFAULT_HEADER_NAME: &str = "Authorization";

/// Resolved provider configuration, built once per provider instance.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderConfig {
	/// Base URL of the Hydra admin API.
	pub endpoint: Url,
	/// Authentication applied to every admin API request.
	pub authentication: Option<Authentication>,
	/// Backoff policy for throttled calls; `None` disables retries.
	pub retry: Option<BackoffPolicy>,
}
impl ProviderConfig {
	/// Resolve a provider block, falling back to the process environment.
	pub fn from_attributes(attributes: serde_json::Value) -> Result<Self> {
		Self::from_attributes_with_env(attributes, |name| std::env::var(name).ok())
	}

	/// Resolve a provider block against a custom environment lookup.
	pub fn from_attributes_with_env<F>(attributes: serde_json::Value, env: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let block = serde_json::from_value::<ProviderBlock>(attributes)?;

		block.resolve(&env)
	}

	/// Configuration for `endpoint` with no authentication and no retries.
	pub fn new(endpoint: Url) -> Self {
		Self { endpoint, authentication: None, retry: None }
	}

	/// Attach an authentication method.
	pub fn with_authentication(mut self, authentication: Authentication) -> Self {
		self.authentication = Some(authentication);

		self
	}

	/// Attach a retry policy.
	pub fn with_retry(mut self, retry: BackoffPolicy) -> Self {
		self.retry = Some(retry);

		self
	}
}

/// The single authentication method of a provider instance.
#[derive(Clone, PartialEq)]
pub enum Authentication {
	/// Static basic credentials on every request.
	Basic {
		/// Basic auth username.
		username: String,
		/// Basic auth password.
		password: String,
	},
	/// One fixed header on every request.
	HttpHeader {
		/// Header name.
		name: String,
		/// Header value.
		value: String,
	},
	/// Mutual TLS with a PEM client certificate.
	Tls {
		/// PEM-encoded client certificate.
		certificate: String,
		/// PEM-encoded private key of the certificate.
		key: String,
		/// Skip verification of the server certificate chain and host name.
		insecure_skip_verify: bool,
	},
	/// Bearer tokens from an OAuth2 client-credentials grant.
	OAuth2(OAuth2Credentials),
}
impl Debug for Authentication {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		match self {
			Self::Basic { username, .. } => f
				.debug_struct("Basic")
				.field("username", username)
				.field("password", &"<redacted>")
				.finish(),
			Self::HttpHeader { name, .. } => f
				.debug_struct("HttpHeader")
				.field("name", name)
				.field("value", &"<redacted>")
				.finish(),
			Self::Tls { insecure_skip_verify, .. } => f
				.debug_struct("Tls")
				.field("certificate", &"<redacted>")
				.field("key", &"<redacted>")
				.field("insecure_skip_verify", insecure_skip_verify)
				.finish(),
			Self::OAuth2(credentials) => f.debug_tuple("OAuth2").field(credentials).finish(),
		}
	}
}

/// Client-credentials grant parameters.
#[derive(Clone, PartialEq)]
pub struct OAuth2Credentials {
	/// Token endpoint URL.
	pub token_endpoint: Url,
	/// Client identifier.
	pub client_id: String,
	/// Client secret.
	pub client_secret: String,
	/// Requested audiences, sent space-joined.
	pub audience: Vec<String>,
	/// Requested scopes, sent space-joined.
	pub scopes: Vec<String>,
}
impl Debug for OAuth2Credentials {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("OAuth2Credentials")
			.field("token_endpoint", &self.token_endpoint.as_str())
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("audience", &self.audience)
			.field("scopes", &self.scopes)
			.finish()
	}
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ProviderBlock {
	endpoint: Option<String>,
	authentication: Option<AuthenticationBlock>,
	retry: Option<RetryBlock>,
}
impl ProviderBlock {
	fn resolve(self, env: &dyn Fn(&str) -> Option<String>) -> Result<ProviderConfig> {
		let raw = self
			.endpoint
			.or_else(|| env(ENV_ENDPOINT))
			.ok_or_else(|| {
				Error::validation("endpoint", format!("Required; set it or {ENV_ENDPOINT}."))
			})?;
		let endpoint = Url::parse(&raw)?;

		if !matches!(endpoint.scheme(), "http" | "https") {
			return Err(Error::validation(
				"endpoint",
				format!("Unsupported scheme {:?}; expected http or https.", endpoint.scheme()),
			));
		}

		let authentication = match self.authentication {
			Some(block) => block.resolve(env)?,
			None => None,
		};
		let retry = match self.retry {
			Some(block) => block.resolve()?,
			None => None,
		};

		Ok(ProviderConfig { endpoint, authentication, retry })
	}
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct AuthenticationBlock {
	basic: Option<BasicBlock>,
	http_header: Option<HttpHeaderBlock>,
	oauth2: Option<OAuth2Block>,
	tls: Option<TlsBlock>,
}
impl AuthenticationBlock {
	fn resolve(self, env: &dyn Fn(&str) -> Option<String>) -> Result<Option<Authentication>> {
		let configured = [
			self.basic.is_some(),
			self.http_header.is_some(),
			self.oauth2.is_some(),
			self.tls.is_some(),
		]
		.into_iter()
		.filter(|set| *set)
		.count();

		if configured > 1 {
			return Err(Error::validation(
				"authentication",
				"Only one of basic, http_header, oauth2 or tls may be set.",
			));
		}

		if let Some(basic) = self.basic {
			return Ok(Some(Authentication::Basic {
				username: required(
					"authentication.basic.username",
					basic.username,
					ENV_BASIC_USERNAME,
					env,
				)?,
				password: required(
					"authentication.basic.password",
					basic.password,
					ENV_BASIC_PASSWORD,
					env,
				)?,
			}));
		}
		if let Some(header) = self.http_header {
			return Ok(Some(Authentication::HttpHeader {
				name: header
					.name
					.or_else(|| env(ENV_HEADER_NAME))
					.unwrap_or_else(|| DEFAULT_HEADER_NAME.to_owned()),
				value: required(
					"authentication.http_header.value",
					header.value,
					ENV_HEADER_VALUE,
					env,
				)?,
			}));
		}
		if let Some(oauth2) = self.oauth2 {
			let token_endpoint = required(
				"authentication.oauth2.token_endpoint",
				oauth2.token_endpoint,
				ENV_OAUTH2_TOKEN_ENDPOINT,
				env,
			)?;

			return Ok(Some(Authentication::OAuth2(OAuth2Credentials {
				token_endpoint: Url::parse(&token_endpoint)?,
				client_id: required(
					"authentication.oauth2.client_id",
					oauth2.client_id,
					ENV_OAUTH2_CLIENT_ID,
					env,
				)?,
				client_secret: required(
					"authentication.oauth2.client_secret",
					oauth2.client_secret,
					ENV_OAUTH2_CLIENT_SECRET,
					env,
				)?,
				audience: oauth2
					.audience
					.or_else(|| env(ENV_OAUTH2_AUDIENCE).map(|raw| split_list(&raw)))
					.unwrap_or_default(),
				scopes: oauth2
					.scopes
					.or_else(|| env(ENV_OAUTH2_SCOPES).map(|raw| split_list(&raw)))
					.unwrap_or_default(),
			})));
		}
		if let Some(tls) = self.tls {
			let insecure_skip_verify = match tls.insecure_skip_verify {
				Some(value) => value,
				None =>
					env(ENV_TLS_INSECURE).map(|raw| parse_flag(&raw)).transpose()?.unwrap_or(false),
			};

			return Ok(Some(Authentication::Tls {
				certificate: required(
					"authentication.tls.certificate",
					tls.certificate,
					ENV_TLS_CERT_DATA,
					env,
				)?,
				key: required("authentication.tls.key", tls.key, ENV_TLS_KEY_DATA, env)?,
				insecure_skip_verify,
			}));
		}

		Ok(None)
	}
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BasicBlock {
	username: Option<String>,
	password: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct HttpHeaderBlock {
	name: Option<String>,
	value: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct OAuth2Block {
	token_endpoint: Option<String>,
	client_id: Option<String>,
	client_secret: Option<String>,
	audience: Option<Vec<String>>,
	scopes: Option<Vec<String>>,
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TlsBlock {
	insecure_skip_verify: Option<bool>,
	certificate: Option<String>,
	key: Option<String>,
}

#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RetryBlock {
	enabled: bool,
	#[serde(with = "humantime_serde")]
	max_elapsed_time: Duration,
	#[serde(with = "humantime_serde")]
	max_interval: Duration,
	randomization_factor: f64,
}
impl RetryBlock {
	fn resolve(self) -> Result<Option<BackoffPolicy>> {
		if !self.enabled {
			return Ok(None);
		}

		let policy =
			BackoffPolicy::new(self.max_elapsed_time, self.max_interval, self.randomization_factor);

		policy.validate()?;

		Ok(Some(policy))
	}
}
impl Default for RetryBlock {
	fn default() -> Self {
		Self {
			enabled: false,
			max_elapsed_time: DEFAULT_MAX_ELAPSED_TIME,
			max_interval: DEFAULT_MAX_INTERVAL,
			randomization_factor: DEFAULT_RANDOMIZATION_FACTOR,
		}
	}
}

fn required(
	field: &'static str,
	value: Option<String>,
	variable: &str,
	env: &dyn Fn(&str) -> Option<String>,
) -> Result<String> {
	value
		.or_else(|| env(variable))
		.ok_or_else(|| Error::validation(field, format!("Required; set it or {variable}.")))
}

// Environment lists accept commas or whitespace as separators.
fn split_list(raw: &str) -> Vec<String> {
	raw.split(|c: char| c == ',' || c.is_whitespace())
		.filter(|item| !item.is_empty())
		.map(ToOwned::to_owned)
		.collect()
}

fn parse_flag(raw: &str) -> Result<bool> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "t" | "true" => Ok(true),
		"0" | "f" | "false" | "" => Ok(false),
		other => Err(Error::validation(
			"authentication.tls.insecure_skip_verify",
			format!("{ENV_TLS_INSECURE} must be a boolean, got {other:?}."),
		)),
	}
}
