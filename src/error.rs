//! Client-level error types shared across flows, stores, and the typed API surface.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The session can no longer be used; callers should send the user to the login surface.
	#[error(transparent)]
	Session(#[from] SessionError),
	/// Upstream returned a body that could not be decoded.
	#[error(transparent)]
	Response(#[from] ResponseError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Request was still rejected after retrying with a refreshed access token.
	#[error("Request is still unauthorized after refreshing the access token.")]
	Unauthorized,
	/// Upstream answered with a non-success status other than 401.
	#[error("API responded with status {status}: {message}.")]
	Api {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		message: String,
	},
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] http::Error),
	/// Endpoint URL could not be assembled from the configured base.
	#[error("Endpoint URL for `{path}` is invalid.")]
	InvalidEndpoint {
		/// Relative path that failed to join.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request payload could not be serialized.
	#[error("Request body could not be encoded as JSON.")]
	RequestEncode(#[source] serde_json::Error),
	/// Client configuration failed validation.
	#[error(transparent)]
	InvalidConfig(#[from] crate::config::ClientConfigError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Session failures. Every variant forces a logout.
///
/// The type is [`Clone`] so a single refresh outcome can be handed to every request waiting on
/// it.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SessionError {
	/// No access token is stored; the user never logged in or already logged out.
	#[error("No session is active.")]
	NotLoggedIn,
	/// No usable refresh token is stored.
	#[error("No refresh token is stored for the current session.")]
	MissingRefreshToken,
	/// Stored or supplied credential could not be decoded.
	#[error("Stored credential is malformed: {reason}.")]
	MalformedCredential {
		/// Decoder-supplied reason string.
		reason: String,
	},
	/// Access token is past its `exp` claim.
	#[error("Access token has expired.")]
	Expired,
	/// Refresh exchange failed at the transport or HTTP level.
	#[error("Refresh exchange failed: {reason}.")]
	RefreshFailed {
		/// Transport- or upstream-supplied reason string.
		reason: String,
		/// HTTP status code, when a response was received.
		status: Option<u16>,
	},
	/// Refresh exchange succeeded but the body carried no access token.
	#[error("Refresh exchange response did not include an access token.")]
	MissingAccessToken,
	/// Token pair could not be read or written.
	#[error("Session storage failed: {reason}.")]
	Storage {
		/// Backend-supplied reason string.
		reason: String,
	},
}

/// Response decoding failures.
#[derive(Debug, ThisError)]
pub enum ResponseError {
	/// Upstream responded with malformed JSON that could not be parsed.
	#[error("API returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code.
		status: u16,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
