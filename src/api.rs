//! Typed endpoint wrappers over the authenticated pipeline.
//!
//! These mirror the SimpleNote service surface: credential exchange and account management under
//! `/api/auth/`, and the notes resource under `/api/notes/`. Every call funnels through
//! [`AuthenticatedClient::execute`], so credential expiry is recovered transparently before a
//! payload is ever decoded.

pub mod auth;
pub mod dto;
pub mod notes;

pub use auth::AuthApi;
pub use notes::{NoteFilter, NotesApi};

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*, client::AuthenticatedClient, error::TransportError, http::ApiRequest,
};

/// Errors surfaced by the typed endpoint wrappers.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// Server rejected the call with a non-success status.
	#[error("Server rejected the call with HTTP status {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Detail message extracted from the server's error envelope, when present.
		detail: Option<String>,
	},
	/// Response body could not be decoded into the expected shape.
	#[error("Response body could not be decoded.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response carrying the body.
		status: u16,
	},
}

/// Executes the request and decodes a JSON payload, mapping error envelopes to [`ApiError`].
pub(crate) async fn execute_json<T>(
	client: &AuthenticatedClient,
	request: &ApiRequest,
) -> Result<T>
where
	T: DeserializeOwned,
{
	let response = client.execute(request).await?;
	let status = response.status();
	let bytes = response.bytes().await.map_err(TransportError::from)?;

	if !status.is_success() {
		return Err(
			ApiError::Status { status: status.as_u16(), detail: extract_detail(&bytes) }.into()
		);
	}

	let mut deserializer = serde_json::Deserializer::from_slice(&bytes);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|e| ApiError::Decode { source: e, status: status.as_u16() }.into())
}

/// Executes a request whose success payload is empty or irrelevant (e.g. DELETE).
pub(crate) async fn execute_unit(
	client: &AuthenticatedClient,
	request: &ApiRequest,
) -> Result<()> {
	let response = client.execute(request).await?;
	let status = response.status();

	if status.is_success() {
		return Ok(());
	}

	let bytes = response.bytes().await.map_err(TransportError::from)?;

	Err(ApiError::Status { status: status.as_u16(), detail: extract_detail(&bytes) }.into())
}

/// Pulls the `{"detail": ...}` message out of an error body, tolerating any other shape.
fn extract_detail(bytes: &[u8]) -> Option<String> {
	serde_json::from_slice::<dto::Message>(bytes).ok().and_then(|message| message.detail)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn detail_extraction_tolerates_foreign_shapes() {
		assert_eq!(
			extract_detail(br#"{"detail":"No active account found."}"#),
			Some("No active account found.".into()),
		);
		assert_eq!(extract_detail(br#"{"unrelated":true}"#), None);
		assert_eq!(extract_detail(b"not json at all"), None);
	}
}
