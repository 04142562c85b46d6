//! Storage contracts and built-in credential store implementations.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, credential::Credentials};

/// Boxed future returned by [`CredentialStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for the access/refresh credential pair.
///
/// Implementations must serialize mutations internally so `get` never observes a torn write, and
/// must report write failures to the caller: a refresh whose result cannot be persisted is not a
/// successful refresh.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the latest persisted snapshot, if any.
	fn get(&self) -> StoreFuture<'_, Option<Credentials>>;

	/// Atomically replaces the access credential, updating the refresh credential only when a
	/// new value is supplied (rotation is optional per protocol).
	fn save<'a>(&'a self, access: &'a str, refresh: Option<&'a str>) -> StoreFuture<'a, ()>;

	/// Removes both credentials as a unit (logout).
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
