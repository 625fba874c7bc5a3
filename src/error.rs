//! Crate-wide error types and `Result` alias.

// crates.io
use http::StatusCode;

/// Library-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the Hydra provider crate.
#[allow(missing_docs)]
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	Serde(#[from] serde_json::Error),
	#[error(transparent)]
	Url(#[from] url::ParseError),

	#[error("Admin API returned HTTP status {status} from {url}: {body:?}")]
	HttpStatus { status: StatusCode, url: url::Url, body: Option<String> },
	#[cfg(feature = "prometheus")]
	#[error("Metrics error: {0}")]
	Metrics(String),
	#[error("Resource {id:?} was written remotely but could not be completed: {source}")]
	PartialWrite { id: String, source: Box<Error> },
	#[error("Client certificate rejected: {0}")]
	Tls(String),
	#[error("Token endpoint returned HTTP status {status}: {body:?}")]
	Token { status: StatusCode, body: Option<String> },
	#[error("Validation failed for {field}: {reason}")]
	Validation { field: &'static str, reason: String },
}
impl Error {
	/// HTTP status reported by the admin API, if this error carries one.
	pub fn status(&self) -> Option<StatusCode> {
		match self {
			Self::HttpStatus { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Whether the admin API asked the caller to slow down.
	pub fn is_throttled(&self) -> bool {
		self.status() == Some(StatusCode::TOO_MANY_REQUESTS)
	}

	/// Whether the admin API reported the resource as unreachable for this caller on a read.
	pub fn is_gone(&self) -> bool {
		matches!(self.status(), Some(StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND))
	}

	/// Identifier of a remote resource that exists despite the failure, if any.
	///
	/// Hosts should keep tracking this identifier so the resource is not orphaned.
	pub fn tracked_id(&self) -> Option<&str> {
		match self {
			Self::PartialWrite { id, .. } => Some(id),
			_ => None,
		}
	}

	pub(crate) fn partial_write(id: impl Into<String>, source: Self) -> Self {
		Self::PartialWrite { id: id.into(), source: Box::new(source) }
	}

	pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
		Self::Validation { field, reason: reason.into() }
	}
}
