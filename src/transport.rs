//! Transport primitives for API calls.
//!
//! The module exposes [`ApiHttpClient`] so downstream crates can plug in their own HTTP stack
//! while the client keeps ownership of authorization, refresh, and retry decisions.
//! Implementations only move bytes: they receive a fully formed [`HttpRequest`] and hand back
//! the raw [`HttpResponse`] without interpreting the status code.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::_prelude::*;

/// Request handed to a transport.
pub type HttpRequest = http::Request<Vec<u8>>;
/// Response produced by a transport.
pub type HttpResponse = http::Response<Vec<u8>>;
/// Boxed future returned by [`ApiHttpClient::execute`].
pub type HttpFuture<'a, E> = Pin<Box<dyn Future<Output = Result<HttpResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing API calls.
///
/// Implementations must be `Send + Sync + 'static` so one transport can back the request
/// pipeline and the refresh coordinator at the same time, and the futures they return must be
/// `Send` so a refresh exchange can be shared across executor threads.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends `request` and resolves with whatever response the server produced.
	///
	/// Non-success statuses must resolve as `Ok`; only failures to obtain a response are errors.
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client.execute(request.try_into()?).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// crates.io
	use http::{Method, StatusCode};
	use httpmock::prelude::*;
	// self
	use super::*;

	#[tokio::test]
	async fn reqwest_transport_returns_error_statuses_as_responses() {
		let server = MockServer::start_async().await;
		let mock = server
			.mock_async(|when, then| {
				when.method(GET).path("/missing").header("x-trace", "1");
				then.status(404).header("x-upstream", "yes").body("gone");
			})
			.await;
		let request = http::Request::builder()
			.method(Method::GET)
			.uri(server.url("/missing"))
			.header("x-trace", "1")
			.body(Vec::new())
			.expect("Request fixture should build.");
		let response = ReqwestHttpClient::default()
			.execute(request)
			.await
			.expect("Transport should surface error statuses as responses.");

		mock.assert_async().await;

		assert_eq!(response.status(), StatusCode::NOT_FOUND);
		assert_eq!(response.headers().get("x-upstream").map(|v| v.as_bytes()), Some(&b"yes"[..]));
		assert_eq!(response.body().as_slice(), b"gone");
	}
}
