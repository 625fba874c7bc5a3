//! Typed attribute models exchanged with the host orchestrator.
//!
//! The host hands over a flat, loosely typed attribute bag per resource. It is deserialised once
//! into these structs, where `None` means the attribute was not set, and validated before any
//! remote call is made.

pub mod jwks;
pub mod oauth2_client;

pub use jwks::{GeneratorAttributes, JwkAttributes, JwksAttributes, JwksDataSourceAttributes};
pub use oauth2_client::{Lifespans, OAuth2ClientAttributes};

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::_prelude::*;

/// Permitted values for `access_token_strategy`.
pub const ACCESS_TOKEN_STRATEGIES: &[&str] = &["jwt", "opaque"];
/// Permitted entries of `grant_types`.
pub const GRANT_TYPES: &[&str] = &[
	"authorization_code",
	"client_credentials",
	"implicit",
	"refresh_token",
	"urn:ietf:params:oauth:grant-type:jwt-bearer",
];
/// Permitted entries of `response_types`.
pub const RESPONSE_TYPES: &[&str] = &["code", "id_token", "token"];
/// Permitted values for `subject_type`.
pub const SUBJECT_TYPES: &[&str] = &["pairwise", "public"];
/// Permitted values for `token_endpoint_auth_method`.
pub const TOKEN_ENDPOINT_AUTH_METHODS: &[&str] =
	&["client_secret_basic", "client_secret_post", "none", "private_key_jwt"];
/// Permitted values for a key's `use`.
pub const KEY_USES: &[&str] = &["sig", "enc"];

/// Deserialise a host attribute bag into its typed form.
pub fn from_attributes<T>(attributes: serde_json::Value) -> Result<T>
where
	T: DeserializeOwned,
{
	Ok(serde_json::from_value(attributes)?)
}

/// Serialise typed attributes back into the host's bag representation.
pub fn to_attributes<T>(attributes: &T) -> Result<serde_json::Value>
where
	T: serde::Serialize,
{
	Ok(serde_json::to_value(attributes)?)
}

pub(crate) fn ensure_one_of(field: &'static str, value: &str, allowed: &[&str]) -> Result<()> {
	if allowed.contains(&value) {
		Ok(())
	} else {
		Err(Error::validation(
			field,
			format!("Expected one of {allowed:?}, got {value:?}."),
		))
	}
}

pub(crate) fn ensure_all_of(
	field: &'static str,
	values: &[String],
	allowed: &[&str],
) -> Result<()> {
	values.iter().try_for_each(|value| ensure_one_of(field, value, allowed))
}

pub(crate) fn ensure_non_empty(field: &'static str, value: &str) -> Result<()> {
	if value.is_empty() {
		Err(Error::validation(field, "Must not be empty."))
	} else {
		Ok(())
	}
}
