//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	credential::{CredentialSecret, Credentials},
	store::{CredentialStore, StoreError, StoreFuture},
};

type Slot = Arc<RwLock<Option<Credentials>>>;

/// Thread-safe backend that keeps the credential pair in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Slot);
impl MemoryStore {
	fn save_now(slot: Slot, access: &str, refresh: Option<&str>) -> Result<(), StoreError> {
		let mut guard = slot.write();
		let preserved = match refresh {
			Some(value) => Some(CredentialSecret::new(value)),
			None => guard.as_ref().and_then(|credentials| credentials.refresh.clone()),
		};

		*guard = Some(Credentials { access: CredentialSecret::new(access), refresh: preserved });

		Ok(())
	}

	fn get_now(slot: Slot) -> Option<Credentials> {
		slot.read().clone()
	}

	fn clear_now(slot: Slot) {
		*slot.write() = None;
	}
}
impl CredentialStore for MemoryStore {
	fn get(&self) -> StoreFuture<'_, Option<Credentials>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(Self::get_now(slot)) })
	}

	fn save<'a>(&'a self, access: &'a str, refresh: Option<&'a str>) -> StoreFuture<'a, ()> {
		let slot = self.0.clone();

		Box::pin(async move { Self::save_now(slot, access, refresh) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			Self::clear_now(slot);

			Ok(())
		})
	}
}
