//! Credentials attached to admin API calls.

// crates.io
use hydra_provider::{Authentication, Error, Provider, Result, config::OAuth2Credentials};
use serde_json::json;
use url::Url;
use wiremock::{
	Mock, MockServer, ResponseTemplate,
	matchers::{body_string_contains, header, method, path},
};
// self
use crate::{config_for, init_tracing};

fn empty_set() -> ResponseTemplate {
	ResponseTemplate::new(200).set_body_json(json!({ "keys": [] }))
}

fn credentials(server: &MockServer) -> OAuth2Credentials {
	OAuth2Credentials {
		token_endpoint: Url::parse(&format!("{}/oauth2/token", server.uri()))
			.expect("token endpoint"),
		client_id: "terraform".into(),
		client_secret: "s3cr3t".into(),
		audience: vec!["https://hydra.example.com".into()],
		scopes: vec!["hydra.clients".into(), "hydra.keys".into()],
	}
}

#[tokio::test]
async fn basic_credentials_are_sent_on_every_call() -> Result<()> {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/admin/keys/any"))
		.and(header("authorization", "Basic YWRtaW46c2VjcmV0"))
		.respond_with(empty_set())
		.expect(2)
		.mount(&server)
		.await;

	let provider = Provider::configure(config_for(&server).with_authentication(
		Authentication::Basic { username: "admin".into(), password: "secret".into() },
	))?;

	provider.admin_client().get_json_web_key_set("any").await?;
	provider.admin_client().get_json_web_key_set("any").await?;
	server.verify().await;

	Ok(())
}

#[tokio::test]
async fn custom_header_is_sent_verbatim() -> Result<()> {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/admin/keys/any"))
		.and(header("x-api-key", "k3y"))
		.respond_with(empty_set())
		.expect(1)
		.mount(&server)
		.await;

	let provider = Provider::configure(config_for(&server).with_authentication(
		Authentication::HttpHeader { name: "X-Api-Key".into(), value: "k3y".into() },
	))?;

	provider.admin_client().get_json_web_key_set("any").await?;
	server.verify().await;

	Ok(())
}

#[tokio::test]
async fn client_credentials_token_is_fetched_once_and_reused() -> Result<()> {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("POST"))
		.and(path("/oauth2/token"))
		.and(body_string_contains("grant_type=client_credentials"))
		.and(body_string_contains("client_id=terraform"))
		.and(body_string_contains("scope=hydra.clients+hydra.keys"))
		.and(body_string_contains("audience=https%3A%2F%2Fhydra.example.com"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"access_token": "t0ken",
			"token_type": "bearer",
			"expires_in": 3600
		})))
		.expect(1)
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/admin/keys/any"))
		.and(header("authorization", "Bearer t0ken"))
		.respond_with(empty_set())
		.expect(2)
		.mount(&server)
		.await;

	let provider = Provider::configure(
		config_for(&server).with_authentication(Authentication::OAuth2(credentials(&server))),
	)?;

	provider.admin_client().get_json_web_key_set("any").await?;
	provider.admin_client().get_json_web_key_set("any").await?;
	server.verify().await;

	Ok(())
}

#[tokio::test]
async fn rejected_token_request_fails_the_call() {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("POST"))
		.and(path("/oauth2/token"))
		.respond_with(ResponseTemplate::new(401).set_body_json(json!({
			"error": "invalid_client"
		})))
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.respond_with(empty_set())
		.expect(0)
		.mount(&server)
		.await;

	let provider = Provider::configure(
		config_for(&server).with_authentication(Authentication::OAuth2(credentials(&server))),
	)
	.expect("provider");
	let err = provider.admin_client().get_json_web_key_set("any").await.unwrap_err();

	assert!(matches!(err, Error::Token { status, .. } if status.as_u16() == 401));

	server.verify().await;
}

#[tokio::test]
async fn malformed_client_certificate_fails_configuration() {
	init_tracing();

	let server = MockServer::start().await;
	let result = Provider::configure(config_for(&server).with_authentication(
		Authentication::Tls {
			certificate: "-----BEGIN CERTIFICATE-----\nnot-base64\n-----END CERTIFICATE-----\n"
				.into(),
			key: "not a key".into(),
			insecure_skip_verify: false,
		},
	));

	assert!(matches!(result, Err(Error::Tls(_))));
}

#[tokio::test]
async fn provider_block_resolves_from_attributes() -> Result<()> {
	init_tracing();

	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/admin/keys/any"))
		.and(header("authorization", "Basic YWRtaW46c2VjcmV0"))
		.respond_with(empty_set())
		.expect(1)
		.mount(&server)
		.await;

	let provider = Provider::from_attributes(json!({
		"endpoint": server.uri(),
		"authentication": { "basic": { "username": "admin", "password": "secret" } }
	}))?;

	provider.admin_client().get_json_web_key_set("any").await?;
	server.verify().await;

	Ok(())
}
