//! Single-flight refresh coordination for unauthorized responses.
//!
//! The coordinator reacts to `401 Unauthorized` responses observed by
//! [`AuthenticatedClient`](crate::client::AuthenticatedClient): the first failing request whose
//! retry budget allows it becomes the owner of a refresh episode, performs the exchange on a
//! plain transport, persists the rotated credentials, and publishes the outcome. Requests that
//! fail while the episode is in flight wait on the same guard and reuse the published outcome
//! instead of issuing a second exchange, so at most one refresh call is outstanding at any time
//! regardless of how many requests fail in the same window.
//!
//! The conceptual `IDLE`/`REFRESHING` state machine maps onto two pieces of state: holding the
//! episode mutex *is* the `REFRESHING` state, and the generation counter + published outcome
//! are the pending-result handoff. A request records the generation when it is stamped; finding
//! a different generation under the lock means an episode completed in the meantime and its
//! outcome applies.

mod metrics;

pub use metrics::RefreshMetrics;

// std
use std::{
	sync::atomic::{AtomicU64, Ordering},
	time::Duration,
};
// self
use crate::{
	_prelude::*,
	credential::CredentialSecret,
	error::ConfigError,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::{CredentialStore, StoreError},
};

/// Reasons the coordinator declines to retry an unauthorized request.
///
/// None of these surface as errors from the execution loop: they only decide retry-or-not, and
/// the original unauthorized response is what the caller receives when the answer is "not".
#[derive(Clone, Debug, ThisError)]
pub enum RefreshDenied {
	/// The request was already retried once after a refresh; a second authorization failure is
	/// terminal.
	#[error("Request already consumed its retry budget.")]
	RetryBudgetExceeded,
	/// No refresh credential is stored; the user must re-authenticate.
	#[error("No refresh credential is stored.")]
	NoRefreshCredential,
	/// The refresh exchange failed on the network or was rejected by the server.
	#[error("Refresh exchange failed: {reason}.")]
	ExchangeFailed {
		/// Transport- or server-supplied failure summary.
		reason: String,
		/// HTTP status code returned by the refresh endpoint, when one was received.
		status: Option<u16>,
	},
	/// The refreshed credential could not be persisted and must not be retried with.
	#[error("{0}")]
	Store(
		#[from]
		#[source]
		StoreError,
	),
}

/// Decision returned to the execution loop after an unauthorized response.
#[derive(Clone, Debug)]
pub(crate) enum Recovery {
	/// Rebuild the original request against the refreshed credential and resend it once.
	Retry,
	/// Propagate the original unauthorized response unchanged.
	GiveUp(RefreshDenied),
}

/// Per-request bound on how many times one originating request may be reissued after a refresh.
///
/// The budget is owned by the request execution loop rather than derived from global state, so
/// the bound stays auditable per logical request regardless of transport internals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RetryBudget {
	spent: u8,
}
impl RetryBudget {
	/// Retries allowed per originating request after an authorization-failure refresh.
	pub const PER_REQUEST: u8 = 1;

	/// Consumes one retry slot, returning `false` once the budget is exhausted.
	pub fn try_consume(&mut self) -> bool {
		if self.spent >= Self::PER_REQUEST {
			return false;
		}

		self.spent += 1;

		true
	}

	/// Returns `true` when no retry slots remain.
	pub fn is_exhausted(&self) -> bool {
		self.spent >= Self::PER_REQUEST
	}
}

/// Published result of a completed refresh episode.
#[derive(Clone, Debug)]
enum EpisodeOutcome {
	/// The exchange succeeded and the rotated credentials are persisted.
	Refreshed,
	/// The exchange or the persistence step failed.
	Failed(RefreshDenied),
}

/// Refresh exchange request body.
#[derive(Serialize)]
struct RefreshRequest<'a> {
	refresh: &'a str,
}

/// Refresh exchange success body; `refresh` is present only when the server rotates it.
#[derive(Deserialize)]
struct RefreshExchange {
	access: String,
	refresh: Option<String>,
}

/// Serializes refresh episodes so arbitrarily many concurrently failing requests spend exactly
/// one network exchange between them.
pub struct RefreshCoordinator {
	store: Arc<dyn CredentialStore>,
	transport: ReqwestClient,
	endpoint: Url,
	/// Number of completed episodes; sampled lock-free when stamping outgoing requests.
	generation: AtomicU64,
	/// Outcome of the episode that produced the current generation. `None` only before the
	/// first episode completes, so a generation mismatch always finds a published outcome.
	episode: AsyncMutex<Option<EpisodeOutcome>>,
	metrics: RefreshMetrics,
}
impl RefreshCoordinator {
	/// Relative path of the refresh endpoint on the API host.
	pub const ENDPOINT_PATH: &'static str = "/api/auth/token/refresh/";
	/// Default timeout carried by the refresh exchange, independent of any waiter's deadline.
	pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

	pub(crate) fn new(
		store: Arc<dyn CredentialStore>,
		base_url: &Url,
		timeout: Duration,
	) -> Result<Self, ConfigError> {
		let endpoint = base_url
			.join(Self::ENDPOINT_PATH)
			.map_err(|e| ConfigError::InvalidBaseUrl { source: e })?;
		// The exchange runs on its own transport with no authorizer or refresh handling
		// attached: a rejected refresh call surfaces as an ordinary failed exchange instead of
		// re-entering the coordinator. The transport-level timeout keeps the episode bounded
		// even when every waiter has abandoned it.
		let transport =
			ReqwestClient::builder().timeout(timeout).build().map_err(ConfigError::from)?;

		Ok(Self {
			store,
			transport,
			endpoint,
			generation: AtomicU64::new(0),
			episode: AsyncMutex::new(None),
			metrics: RefreshMetrics::default(),
		})
	}

	/// Returns counters describing refresh episode activity.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Samples the refresh generation for stamping an outgoing request. Never blocks, even
	/// while an episode is in flight.
	pub(crate) fn generation(&self) -> u64 {
		self.generation.load(Ordering::Acquire)
	}

	/// Decides how the execution loop should react to an unauthorized response.
	pub(crate) async fn recover(
		&self,
		stamped_generation: u64,
		budget: &mut RetryBudget,
	) -> Recovery {
		let span = FlowSpan::new(FlowKind::Refresh, "recover");

		span.instrument(self.recover_inner(stamped_generation, budget)).await
	}

	async fn recover_inner(&self, stamped_generation: u64, budget: &mut RetryBudget) -> Recovery {
		if !budget.try_consume() {
			return Recovery::GiveUp(RefreshDenied::RetryBudgetExceeded);
		}

		// Holding this lock is the `REFRESHING` state: the owner performs the exchange while
		// every other unauthorized request blocks here, and the release below is the `IDLE`
		// transition. If the owning future is dropped mid-exchange the next waiter acquires the
		// lock with an unchanged generation and simply owns a fresh episode, so at most one
		// exchange is ever outstanding.
		let mut episode = self.episode.lock().await;

		if self.generation.load(Ordering::Acquire) != stamped_generation {
			// An episode completed after this request was stamped; reuse its published outcome
			// instead of spending a second exchange on the same failure window.
			self.metrics.record_shared();

			return match &*episode {
				Some(EpisodeOutcome::Failed(denied)) => Recovery::GiveUp(denied.clone()),
				_ => Recovery::Retry,
			};
		}

		let current = match self.store.get().await {
			Ok(snapshot) => snapshot,
			Err(err) => return Recovery::GiveUp(RefreshDenied::Store(err)),
		};
		let refresh = match current.and_then(|credentials| credentials.refresh) {
			Some(secret) => secret,
			// Propagated before any network call; the user must re-authenticate.
			None => return Recovery::GiveUp(RefreshDenied::NoRefreshCredential),
		};

		obs::record_flow_outcome(FlowKind::Refresh, FlowOutcome::Attempt);
		self.metrics.record_exchange();

		let outcome = match self.exchange(&refresh).await {
			Ok(exchange) => {
				// A write failure turns the whole episode into a failure: retrying with a
				// credential that was never persisted would desynchronize store and server.
				match self.store.save(&exchange.access, exchange.refresh.as_deref()).await {
					Ok(()) => EpisodeOutcome::Refreshed,
					Err(err) => EpisodeOutcome::Failed(RefreshDenied::Store(err)),
				}
			},
			Err(denied) => EpisodeOutcome::Failed(denied),
		};

		*episode = Some(outcome.clone());
		// Publishing the bumped generation lets requests stamped from here on start episodes of
		// their own rather than consuming this one's outcome.
		self.generation.fetch_add(1, Ordering::Release);

		match outcome {
			EpisodeOutcome::Refreshed => {
				obs::record_flow_outcome(FlowKind::Refresh, FlowOutcome::Success);

				Recovery::Retry
			},
			EpisodeOutcome::Failed(denied) => {
				obs::record_flow_outcome(FlowKind::Refresh, FlowOutcome::Failure);
				self.metrics.record_failure();

				Recovery::GiveUp(denied)
			},
		}
	}

	async fn exchange(&self, refresh: &CredentialSecret) -> Result<RefreshExchange, RefreshDenied> {
		let payload = RefreshRequest { refresh: refresh.expose() };
		let response = self
			.transport
			.post(self.endpoint.clone())
			.json(&payload)
			.send()
			.await
			.map_err(|e| RefreshDenied::ExchangeFailed { reason: e.to_string(), status: None })?;
		let status = response.status();

		if !status.is_success() {
			return Err(RefreshDenied::ExchangeFailed {
				reason: "server rejected the refresh credential".into(),
				status: Some(status.as_u16()),
			});
		}

		let bytes = response.bytes().await.map_err(|e| RefreshDenied::ExchangeFailed {
			reason: e.to_string(),
			status: Some(status.as_u16()),
		})?;
		let mut deserializer = serde_json::Deserializer::from_slice(&bytes);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
			RefreshDenied::ExchangeFailed {
				reason: format!("malformed refresh response at {}", e.path()),
				status: Some(status.as_u16()),
			}
		})
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshCoordinator")
			.field("endpoint", &self.endpoint.as_str())
			.field("generation", &self.generation)
			.finish()
	}
}
