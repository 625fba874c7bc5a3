//! OAuth2 client attributes.

// std
use std::{
	collections::BTreeMap,
	fmt::{Debug, Formatter, Result as FmtResult},
};
// crates.io
use serde::{Deserialize, Serialize};
// self
use crate::{
	_prelude::*,
	codec::lifespan,
	schema::{
		ACCESS_TOKEN_STRATEGIES, GRANT_TYPES, JwkAttributes, RESPONSE_TYPES, SUBJECT_TYPES,
		TOKEN_ENDPOINT_AUTH_METHODS, ensure_all_of, ensure_non_empty, ensure_one_of,
	},
};

/// Attributes of the `hydra_oauth2_client` resource.
#[allow(missing_docs)]
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuth2ClientAttributes {
	/// Identifier tracked by the host; mirrors the remote `client_id`.
	pub id: Option<String>,
	pub access_token_strategy: Option<String>,
	pub allowed_cors_origins: Option<Vec<String>>,
	pub audience: Option<Vec<String>>,
	pub backchannel_logout_session_required: Option<bool>,
	pub backchannel_logout_uri: Option<String>,
	/// Caller-chosen identifier; generated remotely when absent.
	pub client_id: Option<String>,
	pub client_name: Option<String>,
	/// Write-once secret, only ever echoed by the creating response.
	pub client_secret: Option<String>,
	pub client_secret_expires_at: Option<i64>,
	pub client_uri: Option<String>,
	pub contacts: Option<Vec<String>>,
	pub frontchannel_logout_session_required: Option<bool>,
	pub frontchannel_logout_uri: Option<String>,
	pub grant_types: Option<Vec<String>>,
	pub jwk: Option<Vec<JwkAttributes>>,
	pub jwks_uri: Option<String>,
	pub logo_uri: Option<String>,
	/// Flattened metadata; mutually exclusive with `metadata_json`.
	pub metadata: Option<BTreeMap<String, String>>,
	/// Raw JSON metadata; mutually exclusive with `metadata`.
	pub metadata_json: Option<String>,
	pub owner: Option<String>,
	pub policy_uri: Option<String>,
	pub post_logout_redirect_uris: Option<Vec<String>>,
	pub redirect_uris: Option<Vec<String>>,
	pub request_object_signing_alg: Option<String>,
	pub request_uris: Option<Vec<String>>,
	pub response_types: Option<Vec<String>>,
	pub scopes: Option<Vec<String>>,
	pub sector_identifier_uri: Option<String>,
	pub skip_consent: Option<bool>,
	pub subject_type: Option<String>,
	pub token_endpoint_auth_method: Option<String>,
	pub token_endpoint_auth_signing_alg: Option<String>,
	pub tos_uri: Option<String>,
	pub userinfo_signed_response_alg: Option<String>,
	#[serde(flatten)]
	pub lifespans: Lifespans,
}
impl OAuth2ClientAttributes {
	/// Validate the resource before any remote call.
	pub fn validate(&self) -> Result<()> {
		if let Some(client_id) = &self.client_id {
			ensure_non_empty("client_id", client_id)?;
		}
		if let Some(strategy) = &self.access_token_strategy {
			ensure_one_of("access_token_strategy", strategy, ACCESS_TOKEN_STRATEGIES)?;
		}
		if let Some(grant_types) = &self.grant_types {
			ensure_all_of("grant_types", grant_types, GRANT_TYPES)?;
		}
		if let Some(response_types) = &self.response_types {
			ensure_all_of("response_types", response_types, RESPONSE_TYPES)?;
		}
		if let Some(subject_type) = &self.subject_type {
			ensure_one_of("subject_type", subject_type, SUBJECT_TYPES)?;
		}
		if let Some(method) = &self.token_endpoint_auth_method {
			ensure_one_of("token_endpoint_auth_method", method, TOKEN_ENDPOINT_AUTH_METHODS)?;
		}
		if self.metadata.is_some() && self.metadata_json.is_some() {
			return Err(Error::validation(
				"metadata_json",
				"Conflicts with metadata; set only one of them.",
			));
		}

		self.lifespans.validate()?;
		self.jwk.iter().flatten().try_for_each(JwkAttributes::validate)
	}
}
impl Debug for OAuth2ClientAttributes {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("OAuth2ClientAttributes")
			.field("id", &self.id)
			.field("client_id", &self.client_id)
			.field("client_name", &self.client_name)
			.field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
			.field("grant_types", &self.grant_types)
			.field("redirect_uris", &self.redirect_uris)
			.field("lifespans", &self.lifespans)
			.finish_non_exhaustive()
	}
}

/// Per-grant token lifespans, written as duration strings such as `1h` or `90m`.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lifespans {
	pub authorization_code_grant_access_token_lifespan: Option<String>,
	pub authorization_code_grant_id_token_lifespan: Option<String>,
	pub authorization_code_grant_refresh_token_lifespan: Option<String>,
	pub client_credentials_grant_access_token_lifespan: Option<String>,
	pub implicit_grant_access_token_lifespan: Option<String>,
	pub implicit_grant_id_token_lifespan: Option<String>,
	pub jwt_bearer_grant_access_token_lifespan: Option<String>,
	pub refresh_token_grant_access_token_lifespan: Option<String>,
	pub refresh_token_grant_id_token_lifespan: Option<String>,
	pub refresh_token_grant_refresh_token_lifespan: Option<String>,
}
impl Lifespans {
	/// Every lifespan paired with its attribute name.
	pub fn entries(&self) -> [(&'static str, Option<&str>); 10] {
		[
			(
				"authorization_code_grant_access_token_lifespan",
				self.authorization_code_grant_access_token_lifespan.as_deref(),
			),
			(
				"authorization_code_grant_id_token_lifespan",
				self.authorization_code_grant_id_token_lifespan.as_deref(),
			),
			(
				"authorization_code_grant_refresh_token_lifespan",
				self.authorization_code_grant_refresh_token_lifespan.as_deref(),
			),
			(
				"client_credentials_grant_access_token_lifespan",
				self.client_credentials_grant_access_token_lifespan.as_deref(),
			),
			(
				"implicit_grant_access_token_lifespan",
				self.implicit_grant_access_token_lifespan.as_deref(),
			),
			("implicit_grant_id_token_lifespan", self.implicit_grant_id_token_lifespan.as_deref()),
			(
				"jwt_bearer_grant_access_token_lifespan",
				self.jwt_bearer_grant_access_token_lifespan.as_deref(),
			),
			(
				"refresh_token_grant_access_token_lifespan",
				self.refresh_token_grant_access_token_lifespan.as_deref(),
			),
			(
				"refresh_token_grant_id_token_lifespan",
				self.refresh_token_grant_id_token_lifespan.as_deref(),
			),
			(
				"refresh_token_grant_refresh_token_lifespan",
				self.refresh_token_grant_refresh_token_lifespan.as_deref(),
			),
		]
	}

	/// Reject lifespans that are not `<digits><unit>` sequences.
	pub fn validate(&self) -> Result<()> {
		for (field, value) in self.entries() {
			if let Some(value) = value {
				lifespan::parse(field, value)?;
			}
		}

		Ok(())
	}

	/// Compare two lifespan sets by duration rather than spelling.
	pub fn equivalent(&self, other: &Self) -> bool {
		self.entries()
			.iter()
			.zip(other.entries().iter())
			.all(|((_, left), (_, right))| lifespan::equivalent(*left, *right))
	}
}
