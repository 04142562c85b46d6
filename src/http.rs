//! Transport primitives for the authenticated request pipeline.

// crates.io
use reqwest::Method;
use serde_json::Value;
// self
use crate::{_prelude::*, error::ConfigError};

/// Rebuildable description of one logical API request.
///
/// The pipeline may send a request more than once (the original attempt plus at most one retry
/// after a credential refresh), so requests are kept as plain data and turned into a fresh
/// transport request per attempt instead of reusing a consumed builder. The retry therefore
/// re-stamps a rebuilt request against whatever credential the store holds at that moment.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	method: Method,
	path: String,
	query: Vec<(&'static str, String)>,
	body: Option<Value>,
}
impl ApiRequest {
	fn new(method: Method, path: impl Into<String>) -> Self {
		Self { method, path: path.into(), query: Vec::new(), body: None }
	}

	/// Creates a GET request for the provided path.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// Creates a POST request for the provided path.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// Creates a PUT request for the provided path.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::PUT, path)
	}

	/// Creates a DELETE request for the provided path.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::DELETE, path)
	}

	/// Appends a query pair.
	pub fn with_query(mut self, key: &'static str, value: impl ToString) -> Self {
		self.query.push((key, value.to_string()));

		self
	}

	/// Attaches a JSON body.
	pub fn with_json<T>(mut self, body: &T) -> Result<Self, ConfigError>
	where
		T: Serialize,
	{
		self.body =
			Some(serde_json::to_value(body).map_err(|e| ConfigError::RequestBody { source: e })?);

		Ok(self)
	}

	/// Returns the HTTP method of the request.
	pub fn method(&self) -> &Method {
		&self.method
	}

	/// Returns the JSON body, if one is attached.
	pub fn body(&self) -> Option<&Value> {
		self.body.as_ref()
	}

	/// Resolves the absolute URL for this request against the API base URL.
	pub fn url(&self, base: &Url) -> Result<Url, ConfigError> {
		let mut url =
			base.join(&self.path).map_err(|e| ConfigError::InvalidBaseUrl { source: e })?;

		if !self.query.is_empty() {
			let mut pairs = url.query_pairs_mut();

			for (key, value) in &self.query {
				pairs.append_pair(key, value);
			}
		}

		Ok(url)
	}
}
