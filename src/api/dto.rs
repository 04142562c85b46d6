//! Wire types for the SimpleNote REST API, field-for-field with the server's JSON.

// self
use crate::_prelude::*;

/// Username/password payload for the login exchange.
#[derive(Clone, Serialize)]
pub struct TokenRequest {
	/// Account username.
	pub username: String,
	/// Account password; never logged.
	pub password: String,
}
impl Debug for TokenRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRequest")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Access/refresh credential pair returned by the login endpoint.
#[derive(Clone, Deserialize)]
pub struct TokenPair {
	/// Access credential for protected requests.
	pub access: String,
	/// Refresh credential for later access renewal.
	pub refresh: String,
}
impl Debug for TokenPair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenPair")
			.field("access", &"<redacted>")
			.field("refresh", &"<redacted>")
			.finish()
	}
}

/// Registration payload; optional name fields are omitted from the JSON when unset.
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
	/// Desired username.
	pub username: String,
	/// Account password; never logged.
	pub password: String,
	/// Contact email address.
	pub email: String,
	/// Optional given name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	/// Optional family name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
}
impl Debug for RegisterRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RegisterRequest")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.field("email", &self.email)
			.field("first_name", &self.first_name)
			.field("last_name", &self.last_name)
			.finish()
	}
}

/// Account echo returned by the registration endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct RegisterResponse {
	/// Registered username.
	pub username: String,
	/// Registered email address.
	pub email: String,
	/// Optional given name.
	pub first_name: Option<String>,
	/// Optional family name.
	pub last_name: Option<String>,
}

/// Password rotation payload.
#[derive(Clone, Serialize)]
pub struct ChangePasswordRequest {
	/// Current password; never logged.
	pub old_password: String,
	/// Replacement password; never logged.
	pub new_password: String,
}
impl Debug for ChangePasswordRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ChangePasswordRequest")
			.field("old_password", &"<redacted>")
			.field("new_password", &"<redacted>")
			.finish()
	}
}

/// Generic `{"detail": ...}` envelope used by several endpoints for status messages and errors.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Message {
	/// Human-readable server message, when one was supplied.
	#[serde(default)]
	pub detail: Option<String>,
}

/// Profile payload returned by the userinfo endpoint; name fields are nullable server-side.
#[derive(Clone, Debug, Deserialize)]
pub struct UserInfo {
	/// Account identifier.
	pub id: i64,
	/// Account username.
	pub username: String,
	/// Contact email address.
	pub email: String,
	/// Optional given name.
	pub first_name: Option<String>,
	/// Optional family name.
	pub last_name: Option<String>,
}

/// A note as stored by the server.
#[derive(Clone, Debug, Deserialize)]
pub struct Note {
	/// Note identifier.
	pub id: i64,
	/// Note title.
	pub title: String,
	/// Note body.
	pub description: String,
	/// Server-side creation timestamp, verbatim.
	pub created_at: String,
	/// Server-side update timestamp, verbatim.
	pub updated_at: String,
	/// Display name of the creator, when exposed.
	pub creator_name: Option<String>,
	/// Username of the creator, when exposed.
	pub creator_username: Option<String>,
}

/// Create/update payload for a note.
#[derive(Clone, Debug, Serialize)]
pub struct NoteRequest {
	/// Note title.
	pub title: String,
	/// Note body.
	pub description: String,
}

/// One page of the notes listing.
#[derive(Clone, Debug, Deserialize)]
pub struct PaginatedNoteList {
	/// Total number of notes matching the query.
	pub count: u64,
	/// URL of the next page, if any.
	pub next: Option<String>,
	/// URL of the previous page, if any.
	pub previous: Option<String>,
	/// Notes on this page.
	pub results: Vec<Note>,
}
