//! Credential login and explicit logout.
//!
//! Login bypasses the refresh pipeline: a 401 from the login endpoint means the credentials were
//! rejected, not that a session needs rotating.

// crates.io
use http::{
	Method,
	header::{ACCEPT, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::{SessionTokens, TokenGrant},
	error::{ConfigError, SessionError, TransportError},
	flows::{ApiClient, common},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	transport::ApiHttpClient,
};

#[derive(Serialize)]
struct Credentials<'a> {
	username: &'a str,
	password: &'a str,
}

impl<C> ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Exchanges a username/password pair for a session and persists the issued tokens.
	pub async fn login_with_credentials(
		&self,
		username: &str,
		password: &str,
	) -> Result<SessionTokens> {
		const KIND: FlowKind = FlowKind::Login;

		let span = FlowSpan::new(KIND, "login_with_credentials");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let body = serde_json::to_vec(&Credentials { username, password })
					.map_err(ConfigError::RequestEncode)?;
				let request = http::Request::builder()
					.method(Method::POST)
					.uri(self.config.login_endpoint()?.as_str())
					.header(CONTENT_TYPE, "application/json")
					.header(ACCEPT, "application/json")
					.body(body)
					.map_err(ConfigError::from)?;
				let response = self
					.http_client
					.execute(request)
					.await
					.map_err(|e| Error::Transport(TransportError::network(e)))?;

				if !response.status().is_success() {
					return Err(common::api_error(&response));
				}

				let tokens =
					common::decode_json::<TokenGrant>(response.status(), response.body())?
						.into_tokens()
						.ok_or(SessionError::MissingAccessToken)?;

				self.tokens.save(&tokens).await?;
				self.coordinator.observer().token_refreshed(&tokens.access_token);

				Ok::<_, Error>(tokens)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Clears the stored token pair and tells the observer the session ended.
	pub async fn logout(&self) -> Result<()> {
		self.tokens.clear().await?;
		self.coordinator.observer().session_ended(self.coordinator.login_redirect());

		Ok(())
	}
}
