//! Authentication endpoints and credential lifecycle glue.

// self
use crate::{
	_prelude::*,
	api::{
		self,
		dto::{
			ChangePasswordRequest, Message, RegisterRequest, RegisterResponse, TokenPair,
			TokenRequest, UserInfo,
		},
	},
	client::AuthenticatedClient,
	http::ApiRequest,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Account endpoints: login, registration, profile, password rotation, and logout.
#[derive(Clone, Debug)]
pub struct AuthApi {
	client: AuthenticatedClient,
}
impl AuthApi {
	/// Wraps the provided client.
	pub fn new(client: AuthenticatedClient) -> Self {
		Self { client }
	}

	/// Exchanges a username/password pair for credentials and persists them as a unit.
	pub async fn login(&self, username: &str, password: &str) -> Result<()> {
		const KIND: FlowKind = FlowKind::Login;

		let span = FlowSpan::new(KIND, "login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let body =
					TokenRequest { username: username.into(), password: password.into() };
				let request = ApiRequest::post("/api/auth/token/").with_json(&body)?;
				let pair: TokenPair = api::execute_json(&self.client, &request).await?;

				self.client.store().save(&pair.access, Some(pair.refresh.as_str())).await?;

				Ok(())
			})
			.await;

		match &result {
			Ok(()) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Creates a new account.
	pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse> {
		const KIND: FlowKind = FlowKind::Register;

		let span = FlowSpan::new(KIND, "register");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = ApiRequest::post("/api/auth/register/").with_json(request)?;

				api::execute_json(&self.client, &request).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Fetches the authenticated account's profile.
	pub async fn userinfo(&self) -> Result<UserInfo> {
		api::execute_json(&self.client, &ApiRequest::get("/api/auth/userinfo/")).await
	}

	/// Rotates the account password.
	pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<Message> {
		let body = ChangePasswordRequest {
			old_password: old_password.into(),
			new_password: new_password.into(),
		};
		let request = ApiRequest::post("/api/auth/change-password/").with_json(&body)?;

		api::execute_json(&self.client, &request).await
	}

	/// Clears stored credentials as a unit. Purely local; the server is not contacted.
	pub async fn logout(&self) -> Result<()> {
		self.client.store().clear().await?;

		Ok(())
	}
}
