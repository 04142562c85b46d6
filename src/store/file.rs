//! Simple file-backed [`CredentialStore`] that survives process restarts.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	credential::{CredentialSecret, Credentials},
	store::{CredentialStore, StoreError, StoreFuture},
};

/// Persists the credential pair to a JSON file after each mutation.
///
/// Writes go through a temp-file + rename sequence so a crash mid-write never leaves a torn
/// snapshot behind; readers either see the previous pair or the new one.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Option<Credentials>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = if path.exists() { Self::load_snapshot(&path)? } else { None };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<Option<Credentials>, StoreError> {
		if !path.exists() {
			return Ok(None);
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(None);
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(&self, contents: &Option<Credentials>) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized = serde_json::to_vec_pretty(contents).map_err(|e| {
			StoreError::Serialization { message: format!("Failed to serialize snapshot: {e}") }
		})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl CredentialStore for FileStore {
	fn get(&self) -> StoreFuture<'_, Option<Credentials>> {
		Box::pin(async move { Ok(self.inner.read().clone()) })
	}

	fn save<'a>(&'a self, access: &'a str, refresh: Option<&'a str>) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let preserved = match refresh {
				Some(value) => Some(CredentialSecret::new(value)),
				None => guard.as_ref().and_then(|credentials| credentials.refresh.clone()),
			};

			*guard =
				Some(Credentials { access: CredentialSecret::new(access), refresh: preserved });
			self.persist_locked(&guard)?;

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			*guard = None;
			self.persist_locked(&guard)?;

			Ok(())
		})
	}
}
