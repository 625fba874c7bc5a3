//! `hydra_oauth2_client` lifecycle.

// self
use crate::{
	_prelude::*,
	codec::oauth2_client as codec,
	http::client::AdminClient,
	resource::{ChangeAction, Reconciler, tracked_id},
	schema::{Lifespans, OAuth2ClientAttributes},
};

/// Reconciler for OAuth2 clients.
#[derive(Clone, Debug)]
pub struct OAuth2ClientReconciler {
	client: Arc<AdminClient>,
}
impl OAuth2ClientReconciler {
	/// Reconciler issuing calls through `client`.
	pub fn new(client: Arc<AdminClient>) -> Self {
		Self { client }
	}

	// Read without the gone rule.
	async fn fetch(
		&self,
		id: &str,
		prior: &OAuth2ClientAttributes,
	) -> Result<OAuth2ClientAttributes> {
		let remote = self.client.get_oauth2_client(id).await?;

		codec::encode(&remote, prior)
	}
}
impl Reconciler for OAuth2ClientReconciler {
	type Attributes = OAuth2ClientAttributes;

	const KIND: &'static str = "hydra_oauth2_client";

	#[tracing::instrument(
		skip_all,
		fields(kind = Self::KIND, client_id = attributes.client_id.as_deref().unwrap_or_default())
	)]
	async fn create(&self, attributes: &OAuth2ClientAttributes) -> Result<OAuth2ClientAttributes> {
		let request = codec::decode(attributes)?;
		let created = self.client.create_oauth2_client(&request).await?;
		let state = codec::encode(&created, attributes).map_err(|err| match &created.client_id {
			Some(id) => Error::partial_write(id.as_str(), err),
			None => err,
		})?;
		let Some(id) = state.id.clone() else {
			return Err(Error::validation("client_id", "Missing from the create response."));
		};

		tracing::debug!(id = %id, "oauth2 client created");

		let refreshed = self.fetch(&id, &state).await;

		refreshed.map_err(|err| Error::partial_write(id, err))
	}

	#[tracing::instrument(skip_all, fields(kind = Self::KIND, id = attributes.id.as_deref()))]
	async fn read(&self, attributes: &OAuth2ClientAttributes) -> Result<OAuth2ClientAttributes> {
		let id = tracked_id("id", attributes.id.as_deref())?;

		match self.fetch(id, attributes).await {
			Err(err) if err.is_gone() => {
				tracing::warn!(
					status = ?err.status(),
					"oauth2 client is gone; dropping it from state"
				);

				Ok(OAuth2ClientAttributes { id: None, ..attributes.clone() })
			},
			result => result,
		}
	}

	#[tracing::instrument(skip_all, fields(kind = Self::KIND, id = attributes.id.as_deref()))]
	async fn update(&self, attributes: &OAuth2ClientAttributes) -> Result<OAuth2ClientAttributes> {
		let id = tracked_id("id", attributes.id.as_deref())?;
		let request = codec::decode(attributes)?;
		let updated = self.client.set_oauth2_client(id, &request).await?;

		codec::encode(&updated, attributes)
	}

	#[tracing::instrument(skip_all, fields(kind = Self::KIND, id = attributes.id.as_deref()))]
	async fn delete(&self, attributes: &OAuth2ClientAttributes) -> Result<()> {
		let id = tracked_id("id", attributes.id.as_deref())?;

		self.client.delete_oauth2_client(id).await
	}

	async fn import(&self, id: &str) -> Result<OAuth2ClientAttributes> {
		self.read(&OAuth2ClientAttributes { id: Some(id.to_owned()), ..Default::default() }).await
	}

	fn plan(prior: &OAuth2ClientAttributes, proposed: &OAuth2ClientAttributes) -> ChangeAction {
		if prior.id.is_none() {
			return ChangeAction::Replace;
		}
		if proposed.client_id.is_some() && proposed.client_id != prior.client_id {
			return ChangeAction::Replace;
		}
		if !prior.lifespans.equivalent(&proposed.lifespans)
			|| !metadata_json_equivalent(
				prior.metadata_json.as_deref(),
				proposed.metadata_json.as_deref(),
			) {
			return ChangeAction::Update;
		}

		if comparable(prior, proposed) == comparable(proposed, proposed) {
			ChangeAction::NoOp
		} else {
			ChangeAction::Update
		}
	}
}

// Normalise `attributes` for comparison against `proposed`: identifiers and compared-elsewhere
// fields are cleared, and computed fields the proposal leaves unset are ignored.
fn comparable(
	attributes: &OAuth2ClientAttributes,
	proposed: &OAuth2ClientAttributes,
) -> OAuth2ClientAttributes {
	let mut attributes = attributes.clone();

	attributes.id = None;
	attributes.lifespans = Lifespans::default();
	attributes.metadata_json = None;

	if proposed.client_id.is_none() {
		attributes.client_id = None;
	}
	if proposed.client_secret.is_none() {
		attributes.client_secret = None;
	}
	if proposed.subject_type.is_none() {
		attributes.subject_type = None;
	}
	if proposed.scopes.is_none() {
		attributes.scopes = None;
	}
	if proposed.token_endpoint_auth_method.is_none() {
		attributes.token_endpoint_auth_method = None;
	}
	if proposed.userinfo_signed_response_alg.is_none() {
		attributes.userinfo_signed_response_alg = None;
	}

	attributes
}

fn metadata_json_equivalent(prior: Option<&str>, proposed: Option<&str>) -> bool {
	match (prior, proposed) {
		(None, None) => true,
		(Some(prior), Some(proposed)) if prior == proposed => true,
		(Some(prior), Some(proposed)) =>
			match (codec::parse_metadata_json(prior), codec::parse_metadata_json(proposed)) {
				(Ok(prior), Ok(proposed)) => prior == proposed,
				_ => false,
			},
		_ => false,
	}
}
