//! Credential material shared between the store and the request pipeline.

// self
use crate::_prelude::*;

/// Redacted credential wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSecret(String);
impl CredentialSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner credential value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for CredentialSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for CredentialSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("CredentialSecret").field(&"<redacted>").finish()
	}
}
impl Display for CredentialSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Latest persisted access/refresh snapshot.
///
/// The pair is owned exclusively by the credential store; pipeline components re-read the store
/// for every request instead of holding a copy across an await point, so a concurrent refresh can
/// never leave a caller retrying with a stale credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
	/// Short-lived credential attached to protected requests.
	pub access: CredentialSecret,
	/// Longer-lived credential exchanged for a new access credential, if one was issued.
	pub refresh: Option<CredentialSecret>,
}
impl Credentials {
	/// Creates a snapshot holding only an access credential.
	pub fn new(access: impl Into<String>) -> Self {
		Self { access: CredentialSecret::new(access), refresh: None }
	}

	/// Attaches a refresh credential to the snapshot.
	pub fn with_refresh(mut self, refresh: impl Into<String>) -> Self {
		self.refresh = Some(CredentialSecret::new(refresh));

		self
	}

	/// Formats the `Authorization` header value for the access credential.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.access.expose())
	}
}
