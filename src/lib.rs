//! Declarative reconciliation of Ory Hydra OAuth2 clients and JSON Web Key Sets through the Hydra
//! admin API, forming the resource layer behind an infrastructure-as-code provider.
//!
//! A host orchestrator calls [`Provider::configure`] once with the provider block, then drives
//! any number of create/read/update/delete/import calls on the [`resource`] reconcilers. Every
//! remote call goes through a throttling-aware retry wrapper (see [`http::retry`]).

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod codec;
pub mod config;
pub mod http;
pub mod metrics;
pub mod model;
pub mod resource;
pub mod schema;

mod error;
mod provider;
mod _prelude {
	pub use std::{sync::Arc, time::Duration};

	pub use tokio::time::Instant;

	pub use crate::{Error, Result};
}

#[cfg(feature = "prometheus")] pub use crate::metrics::install_default_exporter;
pub use crate::{
	config::{Authentication, ProviderConfig},
	error::{Error, Result},
	http::retry::BackoffPolicy,
	provider::Provider,
	resource::{ChangeAction, Reconciler},
	schema::{JwkAttributes, JwksAttributes, OAuth2ClientAttributes},
};
