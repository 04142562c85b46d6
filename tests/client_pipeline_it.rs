// std
use std::sync::{
	Arc,
	atomic::{AtomicBool, Ordering},
};
// crates.io
use httpmock::prelude::*;
// self
use simplenote_client::{
	_preludet::*,
	client::AuthenticatedClient,
	credential::Credentials,
	http::ApiRequest,
	store::{CredentialStore, MemoryStore, StoreError, StoreFuture},
};

#[tokio::test]
async fn retries_once_with_the_refreshed_credential() {
	let server = MockServer::start_async().await;
	let (client, store) = build_test_client(&server.base_url());

	seed_credentials(&store, "old", Some("r1")).await;

	let stale = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/notes/").header("authorization", "Bearer old");
			then.status(401)
				.header("content-type", "application/json")
				.body(r#"{"detail":"token expired"}"#);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/auth/token/refresh/")
				.json_body(serde_json::json!({ "refresh": "r1" }));
			then.status(200).header("content-type", "application/json").body(r#"{"access":"new"}"#);
		})
		.await;
	let retried = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/notes/").header("authorization", "Bearer new");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"count":0,"next":null,"previous":null,"results":[]}"#);
		})
		.await;
	let response = client
		.execute(&ApiRequest::get("/api/notes/"))
		.await
		.expect("Request should succeed after the refresh.");

	assert_eq!(response.status(), 200);

	stale.assert_async().await;
	refresh.assert_async().await;
	retried.assert_async().await;

	let stored = store
		.get()
		.await
		.expect("Fetching from the store should succeed.")
		.expect("Credentials should remain present after the refresh.");

	assert_eq!(stored.access.expose(), "new");
	assert_eq!(stored.refresh.as_ref().map(|secret| secret.expose()), Some("r1"));
}

#[tokio::test]
async fn second_unauthorized_after_a_refresh_is_terminal() {
	let server = MockServer::start_async().await;
	let (client, store) = build_test_client(&server.base_url());

	seed_credentials(&store, "old", Some("r1")).await;

	let protected = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/notes/");
			then.status(401)
				.header("content-type", "application/json")
				.body(r#"{"detail":"credential rejected"}"#);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/token/refresh/");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access":"still-rejected"}"#);
		})
		.await;
	let response = client
		.execute(&ApiRequest::get("/api/notes/"))
		.await
		.expect("The terminal unauthorized response should be returned, not an error.");

	assert_eq!(response.status(), 401);

	// Original attempt plus exactly one retry; the second rejection consumes no second refresh.
	protected.assert_calls_async(2).await;
	refresh.assert_calls_async(1).await;
}

#[tokio::test]
async fn unauthorized_without_refresh_credential_is_propagated_immediately() {
	let server = MockServer::start_async().await;
	let (client, store) = build_test_client(&server.base_url());

	seed_credentials(&store, "old", None).await;

	let protected = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/notes/");
			then.status(401)
				.header("content-type", "application/json")
				.body(r#"{"detail":"token expired"}"#);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/token/refresh/");
			then.status(200).header("content-type", "application/json").body(r#"{"access":"x"}"#);
		})
		.await;
	let response = client
		.execute(&ApiRequest::get("/api/notes/"))
		.await
		.expect("The unauthorized response should be returned, not an error.");

	assert_eq!(response.status(), 401);

	protected.assert_calls_async(1).await;
	refresh.assert_calls_async(0).await;
}

#[tokio::test]
async fn rejected_refresh_exchange_does_not_reenter_the_coordinator() {
	let server = MockServer::start_async().await;
	let (client, store) = build_test_client(&server.base_url());

	seed_credentials(&store, "old", Some("r-expired")).await;

	let protected = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/notes/");
			then.status(401)
				.header("content-type", "application/json")
				.body(r#"{"detail":"token expired"}"#);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/token/refresh/");
			then.status(401)
				.header("content-type", "application/json")
				.body(r#"{"detail":"refresh token expired"}"#);
		})
		.await;
	let response = client
		.execute(&ApiRequest::get("/api/notes/"))
		.await
		.expect("The original unauthorized response should be returned.");

	assert_eq!(response.status(), 401);

	// The exchange runs on the plain transport, so its own 401 is a failed exchange rather than
	// a recursive trip through refresh handling.
	protected.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;

	let stored = store
		.get()
		.await
		.expect("Fetching from the store should succeed.")
		.expect("Credentials should be left in place for the caller's logout decision.");

	assert_eq!(stored.access.expose(), "old");
	assert_eq!(stored.refresh.as_ref().map(|secret| secret.expose()), Some("r-expired"));
}

#[tokio::test]
async fn failed_refresh_exchange_leaves_the_store_untouched() {
	let server = MockServer::start_async().await;
	let (client, store) = build_test_client(&server.base_url());

	seed_credentials(&store, "old", Some("r1")).await;

	let protected = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/notes/");
			then.status(401)
				.header("content-type", "application/json")
				.body(r#"{"detail":"token expired"}"#);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/token/refresh/");
			then.status(500).body("upstream exploded");
		})
		.await;
	let response = client
		.execute(&ApiRequest::get("/api/notes/"))
		.await
		.expect("The original unauthorized response should be returned.");

	assert_eq!(response.status(), 401);

	protected.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;

	let stored = store
		.get()
		.await
		.expect("Fetching from the store should succeed.")
		.expect("Credentials should be untouched by the failed exchange.");

	assert_eq!(stored.access.expose(), "old");

	assert_eq!(client.coordinator().metrics().failures(), 1);
}

#[tokio::test]
async fn rotated_refresh_credential_is_persisted() {
	let server = MockServer::start_async().await;
	let (client, store) = build_test_client(&server.base_url());

	seed_credentials(&store, "old", Some("r1")).await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/notes/").header("authorization", "Bearer old");
			then.status(401)
				.header("content-type", "application/json")
				.body(r#"{"detail":"token expired"}"#);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/token/refresh/");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access":"new","refresh":"r2"}"#);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/notes/").header("authorization", "Bearer new");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"count":0,"next":null,"previous":null,"results":[]}"#);
		})
		.await;

	let response = client
		.execute(&ApiRequest::get("/api/notes/"))
		.await
		.expect("Request should succeed after the rotating refresh.");

	assert_eq!(response.status(), 200);

	let stored = store
		.get()
		.await
		.expect("Fetching from the store should succeed.")
		.expect("Rotated credentials should be present.");

	assert_eq!(stored.access.expose(), "new");
	assert_eq!(stored.refresh.as_ref().map(|secret| secret.expose()), Some("r2"));
}

/// Store wrapper whose writes can be made to fail on demand.
#[derive(Clone)]
struct FlakyStore {
	inner: MemoryStore,
	fail_saves: Arc<AtomicBool>,
}
impl CredentialStore for FlakyStore {
	fn get(&self) -> StoreFuture<'_, Option<Credentials>> {
		self.inner.get()
	}

	fn save<'a>(&'a self, access: &'a str, refresh: Option<&'a str>) -> StoreFuture<'a, ()> {
		if self.fail_saves.load(Ordering::Relaxed) {
			return Box::pin(async { Err(StoreError::Backend { message: "disk full".into() }) });
		}

		self.inner.save(access, refresh)
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		self.inner.clear()
	}
}

#[tokio::test]
async fn unpersistable_refresh_result_is_treated_as_a_failed_episode() {
	let server = MockServer::start_async().await;
	let flaky =
		FlakyStore { inner: MemoryStore::default(), fail_saves: Arc::new(AtomicBool::new(false)) };

	flaky.save("old", Some("r1")).await.expect("Seeding the flaky store should succeed.");
	flaky.fail_saves.store(true, Ordering::Relaxed);

	let client = AuthenticatedClient::builder(server.base_url(), Arc::new(flaky.clone()))
		.build()
		.expect("Failed to build client over the flaky store.");
	let protected = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/notes/");
			then.status(401)
				.header("content-type", "application/json")
				.body(r#"{"detail":"token expired"}"#);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/token/refresh/");
			then.status(200).header("content-type", "application/json").body(r#"{"access":"new"}"#);
		})
		.await;
	let response = client
		.execute(&ApiRequest::get("/api/notes/"))
		.await
		.expect("The original unauthorized response should be returned.");

	// The exchange succeeded but its result could not be persisted, so no retry happens with the
	// unpersisted credential.
	assert_eq!(response.status(), 401);

	protected.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;

	let stored = flaky
		.get()
		.await
		.expect("Fetching from the flaky store should succeed.")
		.expect("Seeded credentials should still be present.");

	assert_eq!(stored.access.expose(), "old");
}
