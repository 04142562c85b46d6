//! Outbound request filter that stamps the current access credential.

// crates.io
use reqwest::{
	RequestBuilder,
	header::{ACCEPT, AUTHORIZATION},
};
// self
use crate::{_prelude::*, store::CredentialStore};

/// Attaches `Authorization: Bearer <access>` and `Accept: application/json` to outbound requests.
///
/// The authorizer re-reads the store for every request instead of caching a credential across an
/// await point, and never performs network I/O of its own: a missing or empty credential leaves
/// the request unmodified so the server can reject it with a well-defined status. Refresh is
/// strictly a reaction to an observed failure response, never a pre-emptive check here.
#[derive(Clone)]
pub struct RequestAuthorizer {
	store: Arc<dyn CredentialStore>,
}
impl RequestAuthorizer {
	/// Creates an authorizer reading from the provided store.
	pub fn new(store: Arc<dyn CredentialStore>) -> Self {
		Self { store }
	}

	/// Stamps the builder with the current credential, passing it through untouched when no
	/// usable credential is stored.
	pub async fn authorize(
		&self,
		builder: RequestBuilder,
	) -> Result<RequestBuilder, crate::store::StoreError> {
		let builder = builder.header(ACCEPT, "application/json");

		match self.store.get().await? {
			Some(credentials) if !credentials.access.expose().is_empty() =>
				Ok(builder.header(AUTHORIZATION, credentials.bearer())),
			_ => Ok(builder),
		}
	}
}
impl Debug for RequestAuthorizer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("RequestAuthorizer(..)")
	}
}
