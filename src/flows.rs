//! Authorized request orchestration: the API client, credential login, and token refresh.

pub mod login;
pub mod refresh;
pub mod request;

mod common;

pub use refresh::*;
pub use request::*;

// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	error::ConfigError,
	ext::{NoopSessionObserver, SessionObserver},
	store::{KeyValueStore, SessionStore},
	transport::ApiHttpClient,
};
#[cfg(feature = "reqwest")] use crate::transport::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestHttpClient>;

/// Sends authorized calls to the grading API.
///
/// The client owns the transport, the validated configuration, the typed token store, and the
/// refresh coordinator, so individual API operations only describe the call they make. Clones
/// share the coordinator, which keeps refresh exchanges single-flight across every clone.
pub struct ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// HTTP transport used for every outbound request.
	pub http_client: Arc<C>,
	/// Validated client configuration.
	pub config: Arc<ClientConfig>,
	/// Typed view over the persisted token pair.
	pub tokens: SessionStore,
	/// Coordinator shared by every request that hits a 401.
	pub coordinator: RefreshCoordinator<C>,
}
impl<C> ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	///
	/// The configuration is validated before use.
	pub fn with_http_client(
		store: Arc<dyn KeyValueStore>,
		config: ClientConfig,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		config.validate().map_err(ConfigError::from)?;

		let http_client = http_client.into();
		let tokens = SessionStore::new(store, config.storage_keys.clone());
		let coordinator = RefreshCoordinator::new(
			http_client.clone(),
			tokens.clone(),
			&config,
			Arc::new(NoopSessionObserver),
		)?;

		Ok(Self { http_client, config: Arc::new(config), tokens, coordinator })
	}

	/// Routes session notifications to `observer`.
	///
	/// The returned client still shares refresh exchanges and metrics with the clients it was
	/// cloned from.
	pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
		self.coordinator = self.coordinator.with_observer(observer);

		self
	}

	/// Counters for refresh exchanges performed on behalf of this client.
	pub fn refresh_metrics(&self) -> &RefreshMetrics {
		self.coordinator.metrics()
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestHttpClient> {
	/// Creates a client backed by a default reqwest transport.
	pub fn new(store: Arc<dyn KeyValueStore>, config: ClientConfig) -> Result<Self> {
		Self::with_http_client(store, config, ReqwestHttpClient::default())
	}
}
impl<C> Clone for ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			config: self.config.clone(),
			tokens: self.tokens.clone(),
			coordinator: self.coordinator.clone(),
		}
	}
}
impl<C> Debug for ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("tokens", &self.tokens)
			.field("coordinator", &self.coordinator)
			.finish()
	}
}
