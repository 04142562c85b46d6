//! Client-level error types shared across the pipeline, stores, and typed endpoints.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Store(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Server answered a typed endpoint with a non-success status or an undecodable body.
	#[error(transparent)]
	Api(#[from] crate::api::ApiError),
}

/// Configuration and validation failures raised while assembling the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed or extended with an endpoint path.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized.")]
	RequestBody {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
