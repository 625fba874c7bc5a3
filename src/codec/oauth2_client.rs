//! OAuth2 client mapping.

// std
use std::collections::BTreeMap;
// self
use crate::{
	_prelude::*,
	codec::{jwks, lifespan::non_empty},
	model::OAuth2Client,
	schema::{Lifespans, OAuth2ClientAttributes},
};

/// Build the request body for a create or full-replace update.
///
/// Attributes left unset stay off the wire so remote defaults are preserved. Validation runs
/// first, so a malformed block never reaches the network.
pub fn decode(attributes: &OAuth2ClientAttributes) -> Result<OAuth2Client> {
	attributes.validate()?;

	let lifespans = &attributes.lifespans;

	Ok(OAuth2Client {
		access_token_strategy: attributes.access_token_strategy.clone(),
		allowed_cors_origins: attributes.allowed_cors_origins.clone(),
		audience: attributes.audience.clone(),
		authorization_code_grant_access_token_lifespan: non_empty(
			&lifespans.authorization_code_grant_access_token_lifespan,
		),
		authorization_code_grant_id_token_lifespan: non_empty(
			&lifespans.authorization_code_grant_id_token_lifespan,
		),
		authorization_code_grant_refresh_token_lifespan: non_empty(
			&lifespans.authorization_code_grant_refresh_token_lifespan,
		),
		backchannel_logout_session_required: attributes.backchannel_logout_session_required,
		backchannel_logout_uri: attributes.backchannel_logout_uri.clone(),
		client_credentials_grant_access_token_lifespan: non_empty(
			&lifespans.client_credentials_grant_access_token_lifespan,
		),
		client_id: attributes.client_id.clone(),
		client_name: attributes.client_name.clone(),
		client_secret: attributes.client_secret.clone(),
		client_secret_expires_at: attributes.client_secret_expires_at,
		client_uri: attributes.client_uri.clone(),
		contacts: attributes.contacts.clone(),
		created_at: None,
		frontchannel_logout_session_required: attributes.frontchannel_logout_session_required,
		frontchannel_logout_uri: attributes.frontchannel_logout_uri.clone(),
		grant_types: attributes.grant_types.clone(),
		implicit_grant_access_token_lifespan: non_empty(
			&lifespans.implicit_grant_access_token_lifespan,
		),
		implicit_grant_id_token_lifespan: non_empty(&lifespans.implicit_grant_id_token_lifespan),
		jwks: attributes.jwk.as_deref().map(jwks::decode_jwks),
		jwks_uri: attributes.jwks_uri.clone(),
		jwt_bearer_grant_access_token_lifespan: non_empty(
			&lifespans.jwt_bearer_grant_access_token_lifespan,
		),
		logo_uri: attributes.logo_uri.clone(),
		metadata: decode_metadata(attributes)?,
		owner: attributes.owner.clone(),
		policy_uri: attributes.policy_uri.clone(),
		post_logout_redirect_uris: attributes.post_logout_redirect_uris.clone(),
		redirect_uris: attributes.redirect_uris.clone(),
		refresh_token_grant_access_token_lifespan: non_empty(
			&lifespans.refresh_token_grant_access_token_lifespan,
		),
		refresh_token_grant_id_token_lifespan: non_empty(
			&lifespans.refresh_token_grant_id_token_lifespan,
		),
		refresh_token_grant_refresh_token_lifespan: non_empty(
			&lifespans.refresh_token_grant_refresh_token_lifespan,
		),
		request_object_signing_alg: attributes.request_object_signing_alg.clone(),
		request_uris: attributes.request_uris.clone(),
		response_types: attributes.response_types.clone(),
		scope: attributes
			.scopes
			.as_ref()
			.filter(|scopes| !scopes.is_empty())
			.map(|scopes| scopes.join(" ")),
		sector_identifier_uri: attributes.sector_identifier_uri.clone(),
		skip_consent: attributes.skip_consent,
		subject_type: attributes.subject_type.clone(),
		token_endpoint_auth_method: attributes.token_endpoint_auth_method.clone(),
		token_endpoint_auth_signing_alg: attributes.token_endpoint_auth_signing_alg.clone(),
		tos_uri: attributes.tos_uri.clone(),
		updated_at: None,
		userinfo_signed_response_alg: attributes.userinfo_signed_response_alg.clone(),
	})
}

/// Map a remote client back into attributes.
///
/// The identifier always follows the remote `client_id`. The secret is only replaced when the
/// response carries a non-empty one; otherwise the value known from `prior` is kept.
pub fn encode(
	client: &OAuth2Client,
	prior: &OAuth2ClientAttributes,
) -> Result<OAuth2ClientAttributes> {
	let (metadata, metadata_json) = encode_metadata(client.metadata.as_ref())?;
	let client_secret = client
		.client_secret
		.as_ref()
		.filter(|secret| !secret.is_empty())
		.or(prior.client_secret.as_ref())
		.cloned();

	Ok(OAuth2ClientAttributes {
		id: client.client_id.clone().or_else(|| prior.id.clone()),
		access_token_strategy: client.access_token_strategy.clone(),
		allowed_cors_origins: client.allowed_cors_origins.clone(),
		audience: client.audience.clone(),
		backchannel_logout_session_required: client.backchannel_logout_session_required,
		backchannel_logout_uri: client.backchannel_logout_uri.clone(),
		client_id: client.client_id.clone(),
		client_name: client.client_name.clone(),
		client_secret,
		client_secret_expires_at: client.client_secret_expires_at,
		client_uri: client.client_uri.clone(),
		contacts: client.contacts.clone(),
		frontchannel_logout_session_required: client.frontchannel_logout_session_required,
		frontchannel_logout_uri: client.frontchannel_logout_uri.clone(),
		grant_types: client.grant_types.clone(),
		jwk: client
			.jwks
			.as_ref()
			.filter(|set| !set.keys.is_empty())
			.map(jwks::encode_jwks),
		jwks_uri: client.jwks_uri.clone(),
		logo_uri: client.logo_uri.clone(),
		metadata,
		metadata_json,
		owner: client.owner.clone(),
		policy_uri: client.policy_uri.clone(),
		post_logout_redirect_uris: client.post_logout_redirect_uris.clone(),
		redirect_uris: client.redirect_uris.clone(),
		request_object_signing_alg: client.request_object_signing_alg.clone(),
		request_uris: client.request_uris.clone(),
		response_types: client.response_types.clone(),
		scopes: client
			.scope
			.as_deref()
			.filter(|scope| !scope.is_empty())
			.map(|scope| scope.split(' ').map(ToOwned::to_owned).collect()),
		sector_identifier_uri: client.sector_identifier_uri.clone(),
		skip_consent: client.skip_consent,
		subject_type: client.subject_type.clone(),
		token_endpoint_auth_method: client.token_endpoint_auth_method.clone(),
		token_endpoint_auth_signing_alg: client.token_endpoint_auth_signing_alg.clone(),
		tos_uri: client.tos_uri.clone(),
		userinfo_signed_response_alg: client.userinfo_signed_response_alg.clone(),
		lifespans: Lifespans {
			authorization_code_grant_access_token_lifespan: client
				.authorization_code_grant_access_token_lifespan
				.clone(),
			authorization_code_grant_id_token_lifespan: client
				.authorization_code_grant_id_token_lifespan
				.clone(),
			authorization_code_grant_refresh_token_lifespan: client
				.authorization_code_grant_refresh_token_lifespan
				.clone(),
			client_credentials_grant_access_token_lifespan: client
				.client_credentials_grant_access_token_lifespan
				.clone(),
			implicit_grant_access_token_lifespan: client
				.implicit_grant_access_token_lifespan
				.clone(),
			implicit_grant_id_token_lifespan: client.implicit_grant_id_token_lifespan.clone(),
			jwt_bearer_grant_access_token_lifespan: client
				.jwt_bearer_grant_access_token_lifespan
				.clone(),
			refresh_token_grant_access_token_lifespan: client
				.refresh_token_grant_access_token_lifespan
				.clone(),
			refresh_token_grant_id_token_lifespan: client
				.refresh_token_grant_id_token_lifespan
				.clone(),
			refresh_token_grant_refresh_token_lifespan: client
				.refresh_token_grant_refresh_token_lifespan
				.clone(),
		},
	})
}

/// Parse a `metadata_json` document, which must be a JSON object.
pub(crate) fn parse_metadata_json(raw: &str) -> Result<serde_json::Value> {
	let value = serde_json::from_str::<serde_json::Value>(raw)
		.map_err(|err| Error::validation("metadata_json", format!("Invalid JSON: {err}.")))?;

	if value.is_object() {
		Ok(value)
	} else {
		Err(Error::validation("metadata_json", "Must be a JSON object."))
	}
}

fn decode_metadata(attributes: &OAuth2ClientAttributes) -> Result<Option<serde_json::Value>> {
	if let Some(raw) = &attributes.metadata_json {
		return parse_metadata_json(raw).map(Some);
	}

	Ok(attributes.metadata.as_ref().map(|metadata| {
		serde_json::Value::Object(
			metadata
				.iter()
				.map(|(key, value)| (key.clone(), serde_json::Value::String(value.clone())))
				.collect(),
		)
	}))
}

// String-only objects flatten into `metadata`; anything else is kept as raw JSON.
fn encode_metadata(
	metadata: Option<&serde_json::Value>,
) -> Result<(Option<BTreeMap<String, String>>, Option<String>)> {
	let Some(serde_json::Value::Object(object)) = metadata else {
		return Ok((None, None));
	};

	if object.is_empty() {
		return Ok((None, None));
	}

	let flattened = object
		.iter()
		.map(|(key, value)| value.as_str().map(|value| (key.clone(), value.to_owned())))
		.collect::<Option<BTreeMap<_, _>>>();

	match flattened {
		Some(flattened) => Ok((Some(flattened), None)),
		None => Ok((None, Some(serde_json::to_string(object)?))),
	}
}
