//! JSON Web Key and key set attributes.

// std
use std::{
	collections::BTreeMap,
	fmt::{Debug, Formatter, Result as FmtResult},
};
// crates.io
use base64::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
// self
use crate::{
	_prelude::*,
	schema::{KEY_USES, ensure_non_empty, ensure_one_of},
};

/// One key block, shared by `hydra_jwks.key` and `hydra_oauth2_client.jwk`.
#[allow(missing_docs)]
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JwkAttributes {
	pub alg: String,
	pub kid: String,
	#[serde(rename = "use")]
	pub key_use: String,
	pub kty: String,
	pub crv: Option<String>,
	pub d: Option<String>,
	pub dp: Option<String>,
	pub dq: Option<String>,
	pub e: Option<String>,
	pub k: Option<String>,
	pub n: Option<String>,
	pub p: Option<String>,
	pub q: Option<String>,
	pub qi: Option<String>,
	pub x: Option<String>,
	pub x5c: Option<Vec<String>>,
	pub y: Option<String>,
}
impl JwkAttributes {
	/// Check required members and the key material demanded by `kty`.
	pub fn validate(&self) -> Result<()> {
		ensure_non_empty("jwk.alg", &self.alg)?;
		ensure_non_empty("jwk.kid", &self.kid)?;
		ensure_non_empty("jwk.kty", &self.kty)?;
		ensure_one_of("jwk.use", &self.key_use, KEY_USES)?;

		let required: &[(&'static str, &Option<String>)] = match self.kty.as_str() {
			"RSA" => &[("jwk.n", &self.n), ("jwk.e", &self.e)],
			"EC" => &[("jwk.crv", &self.crv), ("jwk.x", &self.x), ("jwk.y", &self.y)],
			"OKP" => &[("jwk.crv", &self.crv), ("jwk.x", &self.x)],
			"oct" => &[("jwk.k", &self.k)],
			_ => &[],
		};

		for &(field, value) in required {
			if value.as_deref().is_none_or(str::is_empty) {
				return Err(Error::validation(
					field,
					format!("Required for key type {:?}.", self.kty),
				));
			}
		}

		for (field, value) in self.encoded_members() {
			if let Some(value) = value.filter(|v| !v.is_empty()) {
				ensure_base64url(field, value)?;
			}
		}
		for certificate in self.x5c.iter().flatten() {
			BASE64_STANDARD.decode(certificate).map_err(|err| {
				Error::validation("jwk.x5c", format!("Invalid base64 certificate: {err}."))
			})?;
		}

		Ok(())
	}

	fn encoded_members(&self) -> [(&'static str, Option<&str>); 11] {
		[
			("jwk.d", self.d.as_deref()),
			("jwk.dp", self.dp.as_deref()),
			("jwk.dq", self.dq.as_deref()),
			("jwk.e", self.e.as_deref()),
			("jwk.k", self.k.as_deref()),
			("jwk.n", self.n.as_deref()),
			("jwk.p", self.p.as_deref()),
			("jwk.q", self.q.as_deref()),
			("jwk.qi", self.qi.as_deref()),
			("jwk.x", self.x.as_deref()),
			("jwk.y", self.y.as_deref()),
		]
	}
}
impl Debug for JwkAttributes {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("JwkAttributes")
			.field("alg", &self.alg)
			.field("kid", &self.kid)
			.field("use", &self.key_use)
			.field("kty", &self.kty)
			.field("crv", &self.crv)
			.field("n", &self.n)
			.finish_non_exhaustive()
	}
}

/// Key generation request; the remote API synthesizes the key material.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorAttributes {
	/// Algorithm of the generated key, e.g. `RS256`.
	pub alg: String,
	/// Key identifier of the generated key.
	pub kid: String,
	/// Intended key use, `sig` or `enc`.
	#[serde(rename = "use")]
	pub key_use: String,
	/// Arbitrary values; changing any of them regenerates the key set.
	#[serde(deserialize_with = "deserialize_keepers")]
	pub keepers: BTreeMap<String, String>,
}
impl GeneratorAttributes {
	/// Validate the generator block.
	pub fn validate(&self) -> Result<()> {
		ensure_non_empty("generator.alg", &self.alg)?;
		ensure_non_empty("generator.kid", &self.kid)?;
		ensure_one_of("generator.use", &self.key_use, KEY_USES)
	}
}

/// Attributes of the `hydra_jwks` resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JwksAttributes {
	/// Identifier tracked by the host; equals `name` once the set exists.
	pub id: Option<String>,
	/// Name of the key set.
	pub name: String,
	/// Keys of the set; computed when a generator is configured.
	pub key: Option<Vec<JwkAttributes>>,
	/// Optional generator block.
	pub generator: Option<GeneratorAttributes>,
}
impl JwksAttributes {
	/// Validate the resource before any remote call.
	pub fn validate(&self) -> Result<()> {
		ensure_non_empty("name", &self.name)?;

		match &self.generator {
			Some(generator) => generator.validate(),
			None => self.key.iter().flatten().try_for_each(JwkAttributes::validate),
		}
	}
}

/// Attributes of the read-only `hydra_jwks` data source.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JwksDataSourceAttributes {
	/// Identifier reported to the host; equals `name`.
	pub id: Option<String>,
	/// Name of the key set to look up.
	pub name: String,
	/// Keys found in the set.
	pub keys: Option<Vec<JwkAttributes>>,
}

fn ensure_base64url(field: &'static str, value: &str) -> Result<()> {
	BASE64_URL_SAFE_NO_PAD
		.decode(value.trim_end_matches('='))
		.map(|_| ())
		.map_err(|err| Error::validation(field, format!("Invalid base64url value: {err}.")))
}

/// Accept scalar keeper values and keep their textual form.
fn deserialize_keepers<'de, D>(
	deserializer: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;

	raw.unwrap_or_default()
		.into_iter()
		.map(|(key, value)| match value {
			serde_json::Value::String(s) => Ok((key, s)),
			serde_json::Value::Number(n) => Ok((key, n.to_string())),
			serde_json::Value::Bool(b) => Ok((key, b.to_string())),
			other => Err(serde::de::Error::custom(format!(
				"keeper {key:?} must be a scalar, got {other}"
			))),
		})
		.collect()
}
