//! JWK and JWKS mapping.
//!
//! Optional key members travel as empty strings on the wire and as `Some("")` in attributes once
//! read back, so what the remote API stores is reflected verbatim.

// self
use crate::{
	model::{CreateJsonWebKeySet, JsonWebKey, JsonWebKeySet},
	schema::{GeneratorAttributes, JwkAttributes},
};

/// Attributes to wire key; unset members become empty strings.
pub fn decode_jwk(attributes: &JwkAttributes) -> JsonWebKey {
	let member = |value: &Option<String>| value.clone().unwrap_or_default();

	JsonWebKey {
		alg: attributes.alg.clone(),
		kid: attributes.kid.clone(),
		key_use: attributes.key_use.clone(),
		kty: attributes.kty.clone(),
		crv: member(&attributes.crv),
		d: member(&attributes.d),
		dp: member(&attributes.dp),
		dq: member(&attributes.dq),
		e: member(&attributes.e),
		k: member(&attributes.k),
		n: member(&attributes.n),
		p: member(&attributes.p),
		q: member(&attributes.q),
		qi: member(&attributes.qi),
		x: member(&attributes.x),
		x5c: attributes.x5c.clone().unwrap_or_default(),
		y: member(&attributes.y),
	}
}

/// Wire key to attributes, keeping empty members as they are.
pub fn encode_jwk(key: &JsonWebKey) -> JwkAttributes {
	JwkAttributes {
		alg: key.alg.clone(),
		kid: key.kid.clone(),
		key_use: key.key_use.clone(),
		kty: key.kty.clone(),
		crv: Some(key.crv.clone()),
		d: Some(key.d.clone()),
		dp: Some(key.dp.clone()),
		dq: Some(key.dq.clone()),
		e: Some(key.e.clone()),
		k: Some(key.k.clone()),
		n: Some(key.n.clone()),
		p: Some(key.p.clone()),
		q: Some(key.q.clone()),
		qi: Some(key.qi.clone()),
		x: Some(key.x.clone()),
		x5c: Some(key.x5c.clone()),
		y: Some(key.y.clone()),
	}
}

/// Key blocks to a wire key set, preserving order.
pub fn decode_jwks(keys: &[JwkAttributes]) -> JsonWebKeySet {
	JsonWebKeySet { keys: keys.iter().map(decode_jwk).collect() }
}

/// Wire key set to key blocks, preserving order.
pub fn encode_jwks(set: &JsonWebKeySet) -> Vec<JwkAttributes> {
	set.keys.iter().map(encode_jwk).collect()
}

/// Generator block to the generate-endpoint request body.
pub fn decode_generator(generator: &GeneratorAttributes) -> CreateJsonWebKeySet {
	CreateJsonWebKeySet {
		alg: generator.alg.clone(),
		kid: generator.kid.clone(),
		key_use: generator.key_use.clone(),
	}
}
