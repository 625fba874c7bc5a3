//! Wire representations exchanged with the Hydra admin API.

// std
use std::fmt::{Debug, Formatter, Result as FmtResult};
// crates.io
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth2 client as stored by Hydra.
///
/// Every field is optional on the wire; `None` is omitted from request bodies so remote defaults
/// stay untouched.
#[allow(missing_docs)]
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuth2Client {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub access_token_strategy: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub allowed_cors_origins: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub audience: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub authorization_code_grant_access_token_lifespan: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub authorization_code_grant_id_token_lifespan: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub authorization_code_grant_refresh_token_lifespan: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub backchannel_logout_session_required: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub backchannel_logout_uri: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub client_credentials_grant_access_token_lifespan: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub client_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub client_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub client_secret: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub client_secret_expires_at: Option<i64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub client_uri: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub contacts: Option<Vec<String>>,
	#[serde(skip_serializing)]
	pub created_at: Option<DateTime<Utc>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub frontchannel_logout_session_required: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub frontchannel_logout_uri: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub grant_types: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub implicit_grant_access_token_lifespan: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub implicit_grant_id_token_lifespan: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub jwks: Option<JsonWebKeySet>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub jwks_uri: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub jwt_bearer_grant_access_token_lifespan: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub logo_uri: Option<String>,
	/// Free-form metadata; any JSON value is accepted by Hydra.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub metadata: Option<serde_json::Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub owner: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub policy_uri: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub post_logout_redirect_uris: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub redirect_uris: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub refresh_token_grant_access_token_lifespan: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub refresh_token_grant_id_token_lifespan: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub refresh_token_grant_refresh_token_lifespan: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub request_object_signing_alg: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub request_uris: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub response_types: Option<Vec<String>>,
	/// Space-delimited scope list.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sector_identifier_uri: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub skip_consent: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub subject_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub token_endpoint_auth_method: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub token_endpoint_auth_signing_alg: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tos_uri: Option<String>,
	#[serde(skip_serializing)]
	pub updated_at: Option<DateTime<Utc>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub userinfo_signed_response_alg: Option<String>,
}
impl Debug for OAuth2Client {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("OAuth2Client")
			.field("client_id", &self.client_id)
			.field("client_name", &self.client_name)
			.field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
			.field("grant_types", &self.grant_types)
			.field("redirect_uris", &self.redirect_uris)
			.finish_non_exhaustive()
	}
}

/// Set of JSON Web Keys.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonWebKeySet {
	/// Keys in the order Hydra returned them.
	#[serde(default)]
	pub keys: Vec<JsonWebKey>,
}

/// Single JSON Web Key as represented by Hydra.
///
/// Members Hydra does not populate arrive as empty strings and are omitted again on the way out.
#[allow(missing_docs)]
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonWebKey {
	#[serde(default)]
	pub alg: String,
	#[serde(default)]
	pub kid: String,
	#[serde(default, rename = "use")]
	pub key_use: String,
	#[serde(default)]
	pub kty: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub crv: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub d: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub dp: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub dq: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub e: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub k: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub n: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub p: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub q: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub qi: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub x: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub x5c: Vec<String>,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub y: String,
}
impl Debug for JsonWebKey {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("JsonWebKey")
			.field("alg", &self.alg)
			.field("kid", &self.kid)
			.field("use", &self.key_use)
			.field("kty", &self.kty)
			.field("crv", &self.crv)
			.field("n", &self.n)
			.field("x5c", &self.x5c.len())
			.finish_non_exhaustive()
	}
}

/// Request body asking Hydra to synthesize a new key set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateJsonWebKeySet {
	/// Algorithm of the generated key.
	pub alg: String,
	/// Key identifier assigned to the generated key.
	pub kid: String,
	/// Intended key use, `sig` or `enc`.
	#[serde(rename = "use")]
	pub key_use: String,
}

/// Error document returned by Hydra on non-2xx responses.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
	/// Short error code.
	#[serde(default)]
	pub error: Option<String>,
	/// Human-readable detail.
	#[serde(default)]
	pub error_description: Option<String>,
	/// HTTP status echoed in the body.
	#[serde(default)]
	pub status_code: Option<u16>,
}
