//! JSON Web Key Set lifecycle and the key set lookup.

// std
use std::collections::BTreeMap;
// crates.io
use hydra_provider::{
	ChangeAction, JwkAttributes, JwksAttributes, Reconciler, Result,
	resource::JwksReconciler,
	schema::{GeneratorAttributes, JwksDataSourceAttributes},
};
use serde_json::json;
use wiremock::{
	Mock, MockServer, ResponseTemplate,
	matchers::{body_partial_json, method, path},
};
// self
use crate::{init_tracing, provider_for};

const MODULUS: &str = "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw";

fn generated_set(kid: &str) -> serde_json::Value {
	json!({
		"keys": [{
			"alg": "RS256",
			"kid": kid,
			"use": "sig",
			"kty": "RSA",
			"n": MODULUS,
			"e": "AQAB"
		}]
	})
}

fn generator(version: &str) -> GeneratorAttributes {
	GeneratorAttributes {
		alg: "RS256".into(),
		kid: "test".into(),
		key_use: "sig".into(),
		keepers: BTreeMap::from([("version".to_owned(), version.to_owned())]),
	}
}

#[tokio::test]
async fn generated_set_is_read_back_with_key_material() -> Result<()> {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("POST"))
		.and(path("/admin/keys/hydra.openid.id-token"))
		.and(body_partial_json(json!({ "alg": "RS256", "kid": "test", "use": "sig" })))
		.respond_with(ResponseTemplate::new(201).set_body_json(generated_set("test")))
		.expect(1)
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/admin/keys/hydra.openid.id-token"))
		.respond_with(ResponseTemplate::new(200).set_body_json(generated_set("test")))
		.expect(1)
		.mount(&server)
		.await;

	let attributes = JwksAttributes {
		name: "hydra.openid.id-token".into(),
		generator: Some(generator("1")),
		..Default::default()
	};
	let state = provider_for(&server).jwks().create(&attributes).await?;
	let keys = state.key.as_deref().unwrap_or_default();

	assert_eq!(state.id.as_deref(), Some("hydra.openid.id-token"));
	assert_eq!(keys.len(), 1);
	assert_eq!(keys[0].alg, "RS256");
	assert_eq!(keys[0].kid, "test");
	assert_eq!(keys[0].key_use, "sig");
	assert!(keys[0].n.as_deref().is_some_and(|n| !n.is_empty()));
	assert_eq!(state.generator, attributes.generator);

	let bumped = JwksAttributes { generator: Some(generator("2")), ..attributes.clone() };

	assert_eq!(JwksReconciler::plan(&state, &bumped), ChangeAction::Replace);
	assert_eq!(JwksReconciler::plan(&state, &attributes), ChangeAction::NoOp);

	server.verify().await;

	Ok(())
}

#[tokio::test]
async fn inline_keys_are_stored_verbatim() -> Result<()> {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("PUT"))
		.and(path("/admin/keys/inline"))
		.and(body_partial_json(json!({
			"keys": [{ "kid": "inlined", "kty": "RSA", "e": "AQAB" }]
		})))
		.respond_with(ResponseTemplate::new(200).set_body_json(generated_set("inlined")))
		.expect(1)
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/admin/keys/inline"))
		.respond_with(ResponseTemplate::new(200).set_body_json(generated_set("inlined")))
		.mount(&server)
		.await;

	let key = JwkAttributes {
		alg: "RS256".into(),
		kid: "inlined".into(),
		key_use: "sig".into(),
		kty: "RSA".into(),
		n: Some(MODULUS.into()),
		e: Some("AQAB".into()),
		..Default::default()
	};
	let attributes =
		JwksAttributes { name: "inline".into(), key: Some(vec![key]), ..Default::default() };
	let state = provider_for(&server).jwks().create(&attributes).await?;

	assert_eq!(state.id.as_deref(), Some("inline"));
	assert_eq!(state.key.as_ref().map(Vec::len), Some(1));
	assert_eq!(JwksReconciler::plan(&state, &attributes), ChangeAction::NoOp);

	server.verify().await;

	Ok(())
}

#[tokio::test]
async fn missing_set_drops_the_tracked_id() -> Result<()> {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/admin/keys/gone"))
		.respond_with(ResponseTemplate::new(404).set_body_json(json!({
			"error": "Not Found",
			"status_code": 404
		})))
		.mount(&server)
		.await;

	let state =
		JwksAttributes { id: Some("gone".into()), name: "gone".into(), ..Default::default() };
	let read = provider_for(&server).jwks().read(&state).await?;

	assert_eq!(read.id, None);
	assert_eq!(read.name, "gone");

	Ok(())
}

#[tokio::test]
async fn data_source_lists_the_keys_of_a_set() -> Result<()> {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/admin/keys/hydra.openid.id-token"))
		.respond_with(ResponseTemplate::new(200).set_body_json(generated_set("public:abc")))
		.mount(&server)
		.await;

	let lookup = JwksDataSourceAttributes {
		name: "hydra.openid.id-token".into(),
		..Default::default()
	};
	let found = provider_for(&server).jwks_data_source().read(&lookup).await?;

	assert_eq!(found.id.as_deref(), Some("hydra.openid.id-token"));
	assert_eq!(found.keys.as_ref().map(|keys| keys[0].kid.as_str()), Some("public:abc"));
	assert_eq!(found.keys.as_ref().and_then(|keys| keys[0].d.as_deref()), Some(""));

	Ok(())
}

#[tokio::test]
async fn import_and_delete_a_set() -> Result<()> {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/admin/keys/existing"))
		.respond_with(ResponseTemplate::new(200).set_body_json(generated_set("existing")))
		.mount(&server)
		.await;
	Mock::given(method("DELETE"))
		.and(path("/admin/keys/existing"))
		.respond_with(ResponseTemplate::new(204))
		.expect(1)
		.mount(&server)
		.await;

	let reconciler = provider_for(&server).jwks();
	let imported = reconciler.import("existing").await?;

	assert_eq!(imported.id.as_deref(), Some("existing"));
	assert_eq!(imported.name, "existing");
	assert_eq!(imported.generator, None);

	reconciler.delete(&imported).await?;
	server.verify().await;

	Ok(())
}

#[tokio::test]
async fn update_stores_the_new_keys_and_reads_them_back() -> Result<()> {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("PUT"))
		.and(path("/admin/keys/inline"))
		.and(body_partial_json(json!({
			"keys": [{ "kid": "rotated", "kty": "RSA", "n": MODULUS }]
		})))
		.respond_with(ResponseTemplate::new(200).set_body_json(generated_set("rotated")))
		.expect(1)
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/admin/keys/inline"))
		.respond_with(ResponseTemplate::new(200).set_body_json(generated_set("rotated")))
		.expect(1)
		.mount(&server)
		.await;

	let rotated = JwkAttributes {
		alg: "RS256".into(),
		kid: "rotated".into(),
		key_use: "sig".into(),
		kty: "RSA".into(),
		n: Some(MODULUS.into()),
		e: Some("AQAB".into()),
		..Default::default()
	};
	let attributes = JwksAttributes {
		id: Some("inline".into()),
		name: "inline".into(),
		key: Some(vec![rotated]),
		generator: None,
	};
	let state = provider_for(&server).jwks().update(&attributes).await?;
	let keys = state.key.as_deref().unwrap_or_default();

	assert_eq!(state.id.as_deref(), Some("inline"));
	assert_eq!(keys.len(), 1);
	assert_eq!(keys[0].kid, "rotated");
	assert_eq!(keys[0].n.as_deref(), Some(MODULUS));

	server.verify().await;

	Ok(())
}

#[tokio::test]
async fn undecodable_write_response_keeps_the_set_tracked() {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("POST"))
		.and(path("/admin/keys/half"))
		.respond_with(ResponseTemplate::new(201).set_body_json(json!({ "keys": "oops" })))
		.mount(&server)
		.await;
	Mock::given(method("PUT"))
		.and(path("/admin/keys/half"))
		.respond_with(ResponseTemplate::new(200).set_body_string("stored"))
		.mount(&server)
		.await;

	let reconciler = provider_for(&server).jwks();
	let generated = JwksAttributes {
		name: "half".into(),
		generator: Some(generator("1")),
		..Default::default()
	};
	let inline =
		JwksAttributes { name: "half".into(), key: Some(Vec::new()), ..Default::default() };

	for attributes in [generated, inline] {
		let err = reconciler.create(&attributes).await.unwrap_err();

		assert_eq!(err.tracked_id(), Some("half"));
	}
}

#[tokio::test]
async fn set_missing_right_after_create_stays_tracked() {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("POST"))
		.and(path("/admin/keys/flaky"))
		.respond_with(ResponseTemplate::new(201).set_body_json(generated_set("test")))
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/admin/keys/flaky"))
		.respond_with(ResponseTemplate::new(404))
		.mount(&server)
		.await;

	let attributes = JwksAttributes {
		name: "flaky".into(),
		generator: Some(generator("1")),
		..Default::default()
	};
	let err = provider_for(&server).jwks().create(&attributes).await.unwrap_err();

	assert_eq!(err.tracked_id(), Some("flaky"));
}
