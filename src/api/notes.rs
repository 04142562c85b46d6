//! Notes resource endpoints: CRUD plus server-side pagination and filtering.

// self
use crate::{
	_prelude::*,
	api::{
		self,
		dto::{Note, NoteRequest, PaginatedNoteList},
	},
	client::AuthenticatedClient,
	http::ApiRequest,
};

/// Optional query parameters for [`NotesApi::filter`].
#[derive(Clone, Debug, Default)]
pub struct NoteFilter {
	/// Match against note titles.
	pub title: Option<String>,
	/// Match against note bodies.
	pub description: Option<String>,
	/// Page number to fetch.
	pub page: Option<u32>,
	/// Page size to request.
	pub page_size: Option<u32>,
}
impl NoteFilter {
	/// Sets the title needle.
	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());

		self
	}

	/// Sets the body needle.
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());

		self
	}

	/// Sets the page number.
	pub fn with_page(mut self, page: u32) -> Self {
		self.page = Some(page);

		self
	}

	/// Sets the page size.
	pub fn with_page_size(mut self, page_size: u32) -> Self {
		self.page_size = Some(page_size);

		self
	}
}

/// Notes endpoints over the authenticated pipeline.
#[derive(Clone, Debug)]
pub struct NotesApi {
	client: AuthenticatedClient,
}
impl NotesApi {
	/// Wraps the provided client.
	pub fn new(client: AuthenticatedClient) -> Self {
		Self { client }
	}

	/// Fetches one page of the notes listing.
	pub async fn list(&self, page: u32, page_size: u32) -> Result<PaginatedNoteList> {
		let request = ApiRequest::get("/api/notes/")
			.with_query("page", page)
			.with_query("page_size", page_size);

		api::execute_json(&self.client, &request).await
	}

	/// Fetches notes matching the provided filter.
	pub async fn filter(&self, filter: &NoteFilter) -> Result<PaginatedNoteList> {
		let mut request = ApiRequest::get("/api/notes/filter");

		if let Some(title) = &filter.title {
			request = request.with_query("title", title);
		}
		if let Some(description) = &filter.description {
			request = request.with_query("description", description);
		}
		if let Some(page) = filter.page {
			request = request.with_query("page", page);
		}
		if let Some(page_size) = filter.page_size {
			request = request.with_query("page_size", page_size);
		}

		api::execute_json(&self.client, &request).await
	}

	/// Creates a note.
	pub async fn create(&self, note: &NoteRequest) -> Result<Note> {
		let request = ApiRequest::post("/api/notes/").with_json(note)?;

		api::execute_json(&self.client, &request).await
	}

	/// Fetches a single note by identifier.
	pub async fn get(&self, id: i64) -> Result<Note> {
		api::execute_json(&self.client, &ApiRequest::get(format!("/api/notes/{id}/"))).await
	}

	/// Replaces a note's title and body.
	pub async fn update(&self, id: i64, note: &NoteRequest) -> Result<Note> {
		let request = ApiRequest::put(format!("/api/notes/{id}/")).with_json(note)?;

		api::execute_json(&self.client, &request).await
	}

	/// Deletes a note.
	pub async fn delete(&self, id: i64) -> Result<()> {
		api::execute_unit(&self.client, &ApiRequest::delete(format!("/api/notes/{id}/"))).await
	}
}
