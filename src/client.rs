//! Authenticated request pipeline composed from a transport, an authorizer, and the refresh
//! coordinator.

pub mod authorizer;
pub mod refresh;

pub use authorizer::*;
pub use refresh::*;

// std
use std::time::Duration;
// crates.io
use reqwest::{Response, StatusCode};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	http::ApiRequest,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::CredentialStore,
};

/// Executes protected API calls, transparently recovering from credential expiry.
///
/// The client owns two transports: the main one used for every protected request, and the
/// coordinator's plain transport reserved for the refresh exchange. Clones share the coordinator
/// and the store, so the at-most-one-refresh-in-flight guarantee spans every clone handed out to
/// collaborators. Construction happens once at the application's composition root; collaborators
/// receive the client explicitly instead of reading process-wide state.
#[derive(Clone)]
pub struct AuthenticatedClient {
	base_url: Url,
	transport: ReqwestClient,
	authorizer: RequestAuthorizer,
	coordinator: Arc<RefreshCoordinator>,
	store: Arc<dyn CredentialStore>,
}
impl AuthenticatedClient {
	/// Returns a builder for the provided base URL and credential store.
	pub fn builder(base_url: impl Into<String>, store: Arc<dyn CredentialStore>) -> ClientBuilder {
		ClientBuilder {
			base_url: base_url.into(),
			store,
			transport: None,
			refresh_timeout: RefreshCoordinator::DEFAULT_TIMEOUT,
		}
	}

	/// Returns the credential store shared with the pipeline.
	pub fn store(&self) -> &Arc<dyn CredentialStore> {
		&self.store
	}

	/// Returns the refresh coordinator shared by every clone of this client.
	pub fn coordinator(&self) -> &RefreshCoordinator {
		&self.coordinator
	}

	/// Executes a request, refreshing the access credential and retrying once on
	/// `401 Unauthorized`.
	///
	/// Any other status is returned as-is, and so is the final `401` when the coordinator
	/// declines to (re-)refresh; the server stays the authority on what a request without a
	/// valid credential means.
	pub async fn execute(&self, request: &ApiRequest) -> Result<Response> {
		let span = FlowSpan::new(FlowKind::Request, "execute");

		obs::record_flow_outcome(FlowKind::Request, FlowOutcome::Attempt);

		let result = span.instrument(self.execute_inner(request)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(FlowKind::Request, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(FlowKind::Request, FlowOutcome::Failure),
		}

		result
	}

	async fn execute_inner(&self, request: &ApiRequest) -> Result<Response> {
		let mut budget = RetryBudget::default();

		loop {
			// The generation is sampled before the authorizer's store read, so an episode that
			// finishes in between is detected as already delivered instead of re-triggered.
			let stamped_generation = self.coordinator.generation();
			let response = self.send_once(request).await?;

			if response.status() != StatusCode::UNAUTHORIZED {
				return Ok(response);
			}

			match self.coordinator.recover(stamped_generation, &mut budget).await {
				Recovery::Retry => continue,
				Recovery::GiveUp(denied) => {
					#[cfg(feature = "tracing")]
					tracing::warn!(
						reason = %denied,
						"Refresh recovery declined; propagating the original response.",
					);
					#[cfg(not(feature = "tracing"))]
					let _ = denied;

					return Ok(response);
				},
			}
		}
	}

	async fn send_once(&self, request: &ApiRequest) -> Result<Response> {
		let url = request.url(&self.base_url)?;
		let mut builder = self.transport.request(request.method().clone(), url);

		if let Some(body) = request.body() {
			builder = builder.json(body);
		}

		let builder = self.authorizer.authorize(builder).await?;

		builder.send().await.map_err(|e| TransportError::from(e).into())
	}
}
impl Debug for AuthenticatedClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticatedClient").field("base_url", &self.base_url.as_str()).finish()
	}
}

/// Builder assembling an [`AuthenticatedClient`] at the composition root.
pub struct ClientBuilder {
	base_url: String,
	store: Arc<dyn CredentialStore>,
	transport: Option<ReqwestClient>,
	refresh_timeout: Duration,
}
impl ClientBuilder {
	/// Replaces the default transport used for protected requests.
	pub fn with_transport(mut self, transport: ReqwestClient) -> Self {
		self.transport = Some(transport);

		self
	}

	/// Overrides the timeout carried by the refresh exchange (defaults to
	/// [`RefreshCoordinator::DEFAULT_TIMEOUT`]).
	pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
		self.refresh_timeout = timeout;

		self
	}

	/// Consumes the builder and produces an [`AuthenticatedClient`].
	pub fn build(self) -> Result<AuthenticatedClient> {
		let base_url =
			Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl { source: e })?;
		let transport = match self.transport {
			Some(client) => client,
			None => ReqwestClient::builder().build().map_err(ConfigError::from)?,
		};
		let coordinator = Arc::new(RefreshCoordinator::new(
			self.store.clone(),
			&base_url,
			self.refresh_timeout,
		)?);

		Ok(AuthenticatedClient {
			base_url,
			transport,
			authorizer: RequestAuthorizer::new(self.store.clone()),
			coordinator,
			store: self.store,
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::MemoryStore;

	#[test]
	fn builder_rejects_invalid_base_url() {
		let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
		let err = AuthenticatedClient::builder("not a url", store)
			.build()
			.expect_err("Builder should reject an unparsable base URL.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidBaseUrl { .. })));
	}

	#[test]
	fn debug_shows_base_url_only() {
		let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
		let client = AuthenticatedClient::builder("http://localhost:9000", store)
			.build()
			.expect("Builder should accept a valid base URL.");

		assert_eq!(
			format!("{client:?}"),
			"AuthenticatedClient { base_url: \"http://localhost:9000/\" }",
		);
	}
}
