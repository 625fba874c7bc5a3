//! `hydra_jwks` lifecycle and the read-only key set lookup.

// self
use crate::{
	_prelude::*,
	codec::jwks as codec,
	http::client::AdminClient,
	resource::{ChangeAction, Reconciler, tracked_id},
	schema::{JwkAttributes, JwksAttributes, JwksDataSourceAttributes},
};

/// Reconciler for JSON Web Key Sets.
#[derive(Clone, Debug)]
pub struct JwksReconciler {
	client: Arc<AdminClient>,
}
impl JwksReconciler {
	/// Reconciler issuing calls through `client`.
	pub fn new(client: Arc<AdminClient>) -> Self {
		Self { client }
	}

	async fn store(&self, set: &str, attributes: &JwksAttributes) -> Result<()> {
		let keys = codec::decode_jwks(attributes.key.as_deref().unwrap_or_default());

		self.client.set_json_web_key_set(set, &keys).await.map(|_| ())
	}

	// Read without the gone rule.
	async fn fetch(&self, id: &str, prior: &JwksAttributes) -> Result<JwksAttributes> {
		let set = self.client.get_json_web_key_set(id).await?;

		Ok(JwksAttributes {
			id: Some(id.to_owned()),
			name: if prior.name.is_empty() { id.to_owned() } else { prior.name.clone() },
			key: Some(codec::encode_jwks(&set)),
			generator: prior.generator.clone(),
		})
	}
}
impl Reconciler for JwksReconciler {
	type Attributes = JwksAttributes;

	const KIND: &'static str = "hydra_jwks";

	#[tracing::instrument(skip_all, fields(kind = Self::KIND, name = %attributes.name))]
	async fn create(&self, attributes: &JwksAttributes) -> Result<JwksAttributes> {
		attributes.validate()?;

		let name = attributes.name.as_str();
		let written = match &attributes.generator {
			Some(generator) => {
				tracing::debug!(alg = %generator.alg, kid = %generator.kid, "generating key set");

				self.client
					.create_json_web_key_set(name, &codec::decode_generator(generator))
					.await
					.map(|_| ())
			},
			None => self.store(name, attributes).await,
		};

		// The remote accepted the write when only the response body was unreadable.
		written.map_err(|err| match err {
			Error::Serde(_) => Error::partial_write(name, err),
			err => err,
		})?;

		self.fetch(name, attributes).await.map_err(|err| Error::partial_write(name, err))
	}

	#[tracing::instrument(skip_all, fields(kind = Self::KIND, id = attributes.id.as_deref()))]
	async fn read(&self, attributes: &JwksAttributes) -> Result<JwksAttributes> {
		let id = tracked_id("id", attributes.id.as_deref())?;

		match self.fetch(id, attributes).await {
			Err(err) if err.is_gone() => {
				tracing::warn!(status = ?err.status(), "key set is gone; dropping it from state");

				Ok(JwksAttributes { id: None, ..attributes.clone() })
			},
			result => result,
		}
	}

	#[tracing::instrument(skip_all, fields(kind = Self::KIND, id = attributes.id.as_deref()))]
	async fn update(&self, attributes: &JwksAttributes) -> Result<JwksAttributes> {
		let id = tracked_id("id", attributes.id.as_deref())?;

		attributes.validate()?;
		self.store(id, attributes).await?;
		self.read(attributes).await
	}

	#[tracing::instrument(skip_all, fields(kind = Self::KIND, id = attributes.id.as_deref()))]
	async fn delete(&self, attributes: &JwksAttributes) -> Result<()> {
		let id = tracked_id("id", attributes.id.as_deref())?;

		self.client.delete_json_web_key_set(id).await
	}

	async fn import(&self, id: &str) -> Result<JwksAttributes> {
		self.read(&JwksAttributes {
			id: Some(id.to_owned()),
			name: id.to_owned(),
			..Default::default()
		})
		.await
	}

	fn plan(prior: &JwksAttributes, proposed: &JwksAttributes) -> ChangeAction {
		if prior.id.is_none()
			|| prior.name != proposed.name
			|| prior.generator != proposed.generator
		{
			return ChangeAction::Replace;
		}
		if proposed.generator.is_some() {
			return ChangeAction::NoOp;
		}

		match (&prior.key, &proposed.key) {
			(_, None) => ChangeAction::NoOp,
			(Some(prior), Some(proposed)) if keys_match(prior, proposed) => ChangeAction::NoOp,
			_ => ChangeAction::Update,
		}
	}
}

/// Read-only lookup of a key set by name.
#[derive(Clone, Debug)]
pub struct JwksDataSource {
	client: Arc<AdminClient>,
}
impl JwksDataSource {
	/// Data source issuing calls through `client`.
	pub fn new(client: Arc<AdminClient>) -> Self {
		Self { client }
	}

	/// Fetch the set named by `attributes.name`; errors surface as-is.
	#[tracing::instrument(skip_all, fields(kind = "hydra_jwks", name = %attributes.name))]
	pub async fn read(
		&self,
		attributes: &JwksDataSourceAttributes,
	) -> Result<JwksDataSourceAttributes> {
		if attributes.name.is_empty() {
			return Err(Error::validation("name", "Must not be empty."));
		}

		let set = self.client.get_json_web_key_set(&attributes.name).await?;

		Ok(JwksDataSourceAttributes {
			id: Some(attributes.name.clone()),
			name: attributes.name.clone(),
			keys: Some(codec::encode_jwks(&set)),
		})
	}
}

fn keys_match(prior: &[JwkAttributes], proposed: &[JwkAttributes]) -> bool {
	prior.len() == proposed.len()
		&& prior.iter().zip(proposed).all(|(prior, proposed)| key_matches(prior, proposed))
}

// Optional members left unset in the proposal are computed and never differ.
fn key_matches(prior: &JwkAttributes, proposed: &JwkAttributes) -> bool {
	fn member<T>(prior: &Option<T>, proposed: &Option<T>) -> bool
	where
		T: PartialEq,
	{
		proposed.is_none() || prior == proposed
	}

	prior.alg == proposed.alg
		&& prior.kid == proposed.kid
		&& prior.key_use == proposed.key_use
		&& prior.kty == proposed.kty
		&& member(&prior.crv, &proposed.crv)
		&& member(&prior.d, &proposed.d)
		&& member(&prior.dp, &proposed.dp)
		&& member(&prior.dq, &proposed.dq)
		&& member(&prior.e, &proposed.e)
		&& member(&prior.k, &proposed.k)
		&& member(&prior.n, &proposed.n)
		&& member(&prior.p, &proposed.p)
		&& member(&prior.q, &proposed.q)
		&& member(&prior.qi, &proposed.qi)
		&& member(&prior.x, &proposed.x)
		&& member(&prior.x5c, &proposed.x5c)
		&& member(&prior.y, &proposed.y)
}
