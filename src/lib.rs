//! Authenticated HTTP client for the SimpleNote REST API—bearer stamping, single-flight
//! credential refresh, and durable credential storage in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod client;
pub mod credential;
pub mod error;
pub mod http;
pub mod obs;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::AuthenticatedClient,
		store::{CredentialStore, MemoryStore},
	};

	/// Constructs an [`AuthenticatedClient`] backed by an in-memory store, returning the store
	/// backend alongside it so tests can seed and inspect credentials directly.
	pub fn build_test_client(base_url: &str) -> (AuthenticatedClient, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let client = AuthenticatedClient::builder(base_url, store)
			.build()
			.expect("Failed to build test client.");

		(client, store_backend)
	}

	/// Seeds the store backend with an access/refresh credential pair.
	pub async fn seed_credentials(store: &MemoryStore, access: &str, refresh: Option<&str>) {
		store.save(access, refresh).await.expect("Failed to seed credential fixture.");
	}
}

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {httpmock as _, simplenote_client as _};
