//! Resource reconcilers driving Hydra toward the declared attributes.
//!
//! Each reconciler implements the host lifecycle (create, read, update, delete, import) for one
//! resource kind, plus [`Reconciler::plan`], which classifies a pending change the way the host's
//! diff should treat it.

pub mod jwks;
pub mod oauth2_client;

pub use jwks::{JwksDataSource, JwksReconciler};
pub use oauth2_client::OAuth2ClientReconciler;

// self
use crate::_prelude::*;

/// How the host should apply a change between two attribute snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeAction {
	/// Nothing to do.
	NoOp,
	/// Update in place.
	Update,
	/// Destroy the remote resource and create it again.
	Replace,
}

/// Host lifecycle contract for one resource kind.
#[allow(async_fn_in_trait)]
pub trait Reconciler {
	/// Typed attribute bag of the resource.
	type Attributes;

	/// Resource type name as registered with the host.
	const KIND: &'static str;

	/// Create the remote resource, then read it back so computed attributes are populated.
	async fn create(&self, attributes: &Self::Attributes) -> Result<Self::Attributes>;

	/// Refresh attributes from the remote resource.
	///
	/// A resource the admin API reports as unauthorized or missing comes back with its `id`
	/// cleared instead of an error, so the host plans a recreate.
	async fn read(&self, attributes: &Self::Attributes) -> Result<Self::Attributes>;

	/// Replace the remote resource with the full attribute set.
	async fn update(&self, attributes: &Self::Attributes) -> Result<Self::Attributes>;

	/// Delete the remote resource.
	async fn delete(&self, attributes: &Self::Attributes) -> Result<()>;

	/// Adopt an existing remote resource by identifier.
	async fn import(&self, id: &str) -> Result<Self::Attributes>;

	/// Classify the change from `prior` state to `proposed` configuration.
	fn plan(prior: &Self::Attributes, proposed: &Self::Attributes) -> ChangeAction;
}

pub(crate) fn tracked_id<'a>(field: &'static str, id: Option<&'a str>) -> Result<&'a str> {
	id.filter(|id| !id.is_empty()).ok_or_else(|| {
		Error::validation(field, "No remote identifier is tracked for this resource.")
	})
}
