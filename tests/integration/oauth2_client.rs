//! OAuth2 client lifecycle against the admin API.

// crates.io
use http::StatusCode;
use hydra_provider::{Error, OAuth2ClientAttributes, Reconciler, Result};
use serde_json::json;
use wiremock::{
	Mock, MockServer, ResponseTemplate,
	matchers::{body_partial_json, method, path},
};
// self
use crate::{init_tracing, provider_for};

fn stored_client(client_id: &str) -> serde_json::Value {
	json!({
		"client_id": client_id,
		"client_name": "dashboard",
		"redirect_uris": ["http://localhost:8080/callback"],
		"response_types": ["code"],
		"grant_types": ["authorization_code"],
		"token_endpoint_auth_method": "none",
		"scope": "openid offline",
		"subject_type": "public",
		"metadata": { "team": "identity" },
		"authorization_code_grant_access_token_lifespan": "1h0m0s",
		"created_at": "2024-01-01T00:00:00Z",
		"updated_at": "2024-01-01T00:00:00Z"
	})
}

fn configured() -> OAuth2ClientAttributes {
	OAuth2ClientAttributes {
		client_name: Some("dashboard".into()),
		redirect_uris: Some(vec!["http://localhost:8080/callback".into()]),
		response_types: Some(vec!["code".into()]),
		grant_types: Some(vec!["authorization_code".into()]),
		token_endpoint_auth_method: Some("none".into()),
		..Default::default()
	}
}

#[tokio::test]
async fn create_reads_back_the_stored_client() -> Result<()> {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("POST"))
		.and(path("/admin/clients"))
		.and(body_partial_json(json!({
			"redirect_uris": ["http://localhost:8080/callback"],
			"response_types": ["code"],
			"token_endpoint_auth_method": "none"
		})))
		.respond_with(ResponseTemplate::new(201).set_body_json(stored_client("generated")))
		.expect(1)
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/admin/clients/generated"))
		.respond_with(ResponseTemplate::new(200).set_body_json(stored_client("generated")))
		.expect(1)
		.mount(&server)
		.await;

	let state = provider_for(&server).oauth2_clients().create(&configured()).await?;

	assert_eq!(state.id.as_deref(), Some("generated"));
	assert_eq!(state.client_id.as_deref(), Some("generated"));
	assert_eq!(state.redirect_uris, Some(vec!["http://localhost:8080/callback".into()]));
	assert_eq!(state.response_types, Some(vec!["code".into()]));
	assert_eq!(state.token_endpoint_auth_method.as_deref(), Some("none"));
	assert_eq!(state.client_secret, None);
	assert_eq!(state.scopes, Some(vec!["openid".into(), "offline".into()]));
	assert_eq!(state.metadata.as_ref().map(|m| m["team"].as_str()), Some("identity"));
	assert_eq!(state.metadata_json, None);

	server.verify().await;

	Ok(())
}

#[tokio::test]
async fn secret_from_the_create_response_survives_reads() -> Result<()> {
	init_tracing();

	let server = MockServer::start().await;
	let mut created = stored_client("confidential");

	created["client_secret"] = json!("generated-secret");
	created["token_endpoint_auth_method"] = json!("client_secret_basic");

	Mock::given(method("POST"))
		.and(path("/admin/clients"))
		.respond_with(ResponseTemplate::new(201).set_body_json(created))
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/admin/clients/confidential"))
		.respond_with(ResponseTemplate::new(200).set_body_json(stored_client("confidential")))
		.mount(&server)
		.await;

	let reconciler = provider_for(&server).oauth2_clients();
	let attributes = OAuth2ClientAttributes {
		client_id: Some("confidential".into()),
		token_endpoint_auth_method: None,
		..configured()
	};
	let state = reconciler.create(&attributes).await?;

	assert_eq!(state.client_secret.as_deref(), Some("generated-secret"));

	let refreshed = reconciler.read(&state).await?;

	assert_eq!(refreshed.client_secret.as_deref(), Some("generated-secret"));
	assert!(!format!("{refreshed:?}").contains("generated-secret"));

	Ok(())
}

#[tokio::test]
async fn unauthorized_read_drops_the_tracked_id() -> Result<()> {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/admin/clients/vanished"))
		.respond_with(ResponseTemplate::new(401).set_body_json(json!({
			"error": "invalid_client",
			"error_description": "Client authentication failed.",
			"status_code": 401
		})))
		.mount(&server)
		.await;

	let state = OAuth2ClientAttributes { id: Some("vanished".into()), ..configured() };
	let read = provider_for(&server).oauth2_clients().read(&state).await?;

	assert_eq!(read.id, None);
	assert_eq!(read.redirect_uris, state.redirect_uris);

	Ok(())
}

#[tokio::test]
async fn server_error_on_read_is_surfaced() {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/admin/clients/dashboard"))
		.respond_with(ResponseTemplate::new(500).set_body_string("boom"))
		.mount(&server)
		.await;

	let state = OAuth2ClientAttributes { id: Some("dashboard".into()), ..configured() };
	let err = provider_for(&server).oauth2_clients().read(&state).await.unwrap_err();

	assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
	assert!(matches!(err, Error::HttpStatus { body: Some(ref body), .. } if body == "boom"));
	assert_eq!(state.id.as_deref(), Some("dashboard"));
}

#[tokio::test]
async fn update_replaces_the_stored_client() -> Result<()> {
	init_tracing();

	let server = MockServer::start().await;
	let mut renamed = stored_client("dashboard");

	renamed["client_name"] = json!("renamed");

	Mock::given(method("PUT"))
		.and(path("/admin/clients/dashboard"))
		.and(body_partial_json(json!({
			"client_id": "dashboard",
			"client_name": "renamed",
			"authorization_code_grant_access_token_lifespan": "90m"
		})))
		.respond_with(ResponseTemplate::new(200).set_body_json(renamed))
		.expect(1)
		.mount(&server)
		.await;

	let mut attributes = OAuth2ClientAttributes {
		id: Some("dashboard".into()),
		client_id: Some("dashboard".into()),
		client_name: Some("renamed".into()),
		..configured()
	};

	attributes.lifespans.authorization_code_grant_access_token_lifespan = Some("90m".into());
	attributes.lifespans.implicit_grant_id_token_lifespan = Some(String::new());

	let state = provider_for(&server).oauth2_clients().update(&attributes).await?;

	assert_eq!(state.client_name.as_deref(), Some("renamed"));

	server.verify().await;

	Ok(())
}

#[tokio::test]
async fn import_and_delete_by_identifier() -> Result<()> {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/admin/clients/existing"))
		.respond_with(ResponseTemplate::new(200).set_body_json(stored_client("existing")))
		.mount(&server)
		.await;
	Mock::given(method("DELETE"))
		.and(path("/admin/clients/existing"))
		.respond_with(ResponseTemplate::new(204))
		.expect(1)
		.mount(&server)
		.await;

	let reconciler = provider_for(&server).oauth2_clients();
	let imported = reconciler.import("existing").await?;

	assert_eq!(imported.id.as_deref(), Some("existing"));
	assert_eq!(imported.client_name.as_deref(), Some("dashboard"));

	reconciler.delete(&imported).await?;
	server.verify().await;

	Ok(())
}

#[tokio::test]
async fn undecodable_create_response_keeps_the_assigned_id() {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("POST"))
		.and(path("/admin/clients"))
		.respond_with(ResponseTemplate::new(201).set_body_json(json!({
			"client_id": "half-written",
			"redirect_uris": "not-a-list"
		})))
		.mount(&server)
		.await;

	let err = provider_for(&server).oauth2_clients().create(&configured()).await.unwrap_err();

	assert_eq!(err.tracked_id(), Some("half-written"));
}

#[tokio::test]
async fn client_missing_right_after_create_stays_tracked() {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("POST"))
		.and(path("/admin/clients"))
		.respond_with(ResponseTemplate::new(201).set_body_json(stored_client("flaky")))
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/admin/clients/flaky"))
		.respond_with(ResponseTemplate::new(404))
		.mount(&server)
		.await;

	let err = provider_for(&server).oauth2_clients().create(&configured()).await.unwrap_err();

	assert_eq!(err.tracked_id(), Some("flaky"));
	assert!(matches!(err, Error::PartialWrite { ref source, .. } if source.is_gone()));
}

#[tokio::test]
async fn invalid_attributes_never_reach_the_network() {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(201))
		.expect(0)
		.mount(&server)
		.await;

	let reconciler = provider_for(&server).oauth2_clients();
	let invalid_lifespan = {
		let mut attributes = configured();

		attributes.lifespans.implicit_grant_access_token_lifespan = Some("1 day".into());
		attributes
	};
	let invalid_metadata =
		OAuth2ClientAttributes { metadata_json: Some("{oops".into()), ..configured() };
	let invalid_grant =
		OAuth2ClientAttributes { grant_types: Some(vec!["password".into()]), ..configured() };

	for attributes in [invalid_lifespan, invalid_metadata, invalid_grant] {
		assert!(matches!(
			reconciler.create(&attributes).await,
			Err(Error::Validation { .. })
		));
	}

	server.verify().await;
}
