//! Single-flight refresh-token exchange.
//!
//! [`RefreshCoordinator::refresh_access_token`] turns any number of concurrent 401s into one
//! upstream exchange. The first caller parks a [`Shared`] future in the in-flight slot; every
//! caller that arrives while the slot is occupied clones and awaits that same future, so all of
//! them observe one outcome. The exchange clears the slot itself once it settles.
//!
//! Callers report the access token their failed request carried. When storage already holds a
//! different token, a rotation finished after that request was dispatched and the caller gets the
//! current token back without another exchange.
//!
//! A failed exchange ends the session: the stored pair is cleared, the observer is told to send
//! the user to the login path, and every waiter receives the same [`SessionError`].

mod metrics;

pub use metrics::RefreshMetrics;

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use futures::future::{BoxFuture, FutureExt, Shared};
use http::{
	Method,
	header::{ACCEPT, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::{RefreshRequest, TokenGrant, TokenSecret},
	config::ClientConfig,
	error::{ResponseError, SessionError},
	ext::SessionObserver,
	flows::common,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::{SessionStore, StoreError},
	transport::ApiHttpClient,
};

const KIND: FlowKind = FlowKind::Refresh;

type SharedRefresh = Shared<BoxFuture<'static, Result<TokenSecret, SessionError>>>;

/// Coordinates refresh-token exchanges so at most one is outstanding at a time.
pub struct RefreshCoordinator<C>
where
	C: ?Sized + ApiHttpClient,
{
	inner: Arc<CoordinatorInner<C>>,
}
impl<C> RefreshCoordinator<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a coordinator that exchanges refresh tokens at the configured refresh endpoint.
	pub fn new(
		http_client: Arc<C>,
		tokens: SessionStore,
		config: &ClientConfig,
		observer: Arc<dyn SessionObserver>,
	) -> Result<Self> {
		Ok(Self {
			inner: Arc::new(CoordinatorInner {
				http_client,
				tokens,
				refresh_endpoint: config.refresh_endpoint()?,
				login_redirect: config.login_redirect.clone(),
				observer,
				metrics: Default::default(),
				slot: Default::default(),
			}),
		})
	}

	/// Returns a coordinator notifying `observer` instead.
	///
	/// Metrics and the in-flight slot stay shared, so exchanges remain single-flight across
	/// every coordinator derived from this one.
	pub fn with_observer(&self, observer: Arc<dyn SessionObserver>) -> Self {
		let inner = &self.inner;

		Self {
			inner: Arc::new(CoordinatorInner {
				http_client: inner.http_client.clone(),
				tokens: inner.tokens.clone(),
				refresh_endpoint: inner.refresh_endpoint.clone(),
				login_redirect: inner.login_redirect.clone(),
				observer,
				metrics: inner.metrics.clone(),
				slot: inner.slot.clone(),
			}),
		}
	}

	/// Counters for exchanges started, finished, and joined.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.inner.metrics
	}

	/// Returns `true` while an exchange is outstanding.
	pub async fn is_refreshing(&self) -> bool {
		self.inner.slot.in_flight.lock().await.is_some()
	}

	pub(crate) fn observer(&self) -> &Arc<dyn SessionObserver> {
		&self.inner.observer
	}

	pub(crate) fn login_redirect(&self) -> &str {
		&self.inner.login_redirect
	}

	/// Obtains an access token to retry a request that was rejected with `stale`.
	///
	/// Joins the outstanding exchange when there is one, returns the stored token when it has
	/// already moved past `stale`, and starts a new exchange otherwise.
	pub async fn refresh_access_token(&self, stale: Option<&TokenSecret>) -> Result<TokenSecret> {
		let span = FlowSpan::new(KIND, "refresh_access_token");
		let refresh = {
			let mut slot = self.inner.slot.in_flight.lock().await;

			if let Some(in_flight) = slot.as_ref() {
				self.inner.metrics.record_coalesced();
				span.debug("joining in-flight refresh exchange");

				in_flight.refresh.clone()
			} else {
				let current = self.inner.tokens.access_token().await?;

				if current.as_ref().map(TokenSecret::expose) != stale.map(TokenSecret::expose) {
					let Some(current) = current else {
						return Err(SessionError::NotLoggedIn.into());
					};

					self.inner.metrics.record_coalesced();
					span.debug("access token already rotated");

					return Ok(current);
				}

				let generation = self.inner.slot.generation.fetch_add(1, Ordering::Relaxed) + 1;
				let refresh = Self::exchange(self.inner.clone(), generation).boxed().shared();

				*slot = Some(InFlight { generation, refresh: refresh.clone() });

				refresh
			}
		};

		Ok(span.instrument(refresh).await?)
	}

	async fn exchange(
		inner: Arc<CoordinatorInner<C>>,
		generation: u64,
	) -> Result<TokenSecret, SessionError> {
		let span = FlowSpan::new(KIND, "exchange");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		inner.metrics.record_attempt();

		let result = span.instrument(inner.rotate()).await;

		match &result {
			Ok(access_token) => {
				inner.observer.token_refreshed(access_token);
				inner.metrics.record_success();
				obs::record_flow_outcome(KIND, FlowOutcome::Success);
			},
			Err(err) => {
				span.warn("refresh exchange failed, ending session", err);

				if let Err(clear_err) = inner.tokens.clear().await {
					span.warn("failed to clear stored tokens", &clear_err);
				}

				inner.observer.session_ended(&inner.login_redirect);
				inner.metrics.record_failure();
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
			},
		}

		inner.release(generation).await;

		result
	}
}
impl<C> Clone for RefreshCoordinator<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self { inner: self.inner.clone() }
	}
}
impl<C> Debug for RefreshCoordinator<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshCoordinator")
			.field("refresh_endpoint", &self.inner.refresh_endpoint.as_str())
			.field("login_redirect", &self.inner.login_redirect)
			.field("metrics", &self.inner.metrics)
			.finish()
	}
}

/// Exchange slot shared by every coordinator derived from the same root.
#[derive(Default)]
struct RefreshSlot {
	in_flight: AsyncMutex<Option<InFlight>>,
	generation: AtomicU64,
}

struct InFlight {
	generation: u64,
	refresh: SharedRefresh,
}

struct CoordinatorInner<C>
where
	C: ?Sized + ApiHttpClient,
{
	http_client: Arc<C>,
	tokens: SessionStore,
	refresh_endpoint: Url,
	login_redirect: String,
	observer: Arc<dyn SessionObserver>,
	metrics: Arc<RefreshMetrics>,
	slot: Arc<RefreshSlot>,
}
impl<C> CoordinatorInner<C>
where
	C: ?Sized + ApiHttpClient,
{
	async fn rotate(&self) -> Result<TokenSecret, SessionError> {
		let refresh_token = self
			.tokens
			.refresh_token()
			.await
			.map_err(storage)?
			.ok_or(SessionError::MissingRefreshToken)?;
		let body = serde_json::to_vec(&RefreshRequest { refresh_token: refresh_token.expose() })
			.map_err(|e| refresh_failed(e, None))?;
		let request = http::Request::builder()
			.method(Method::POST)
			.uri(self.refresh_endpoint.as_str())
			.header(CONTENT_TYPE, "application/json")
			.header(ACCEPT, "application/json")
			.body(body)
			.map_err(|e| refresh_failed(e, None))?;
		let response =
			self.http_client.execute(request).await.map_err(|e| refresh_failed(e, None))?;
		let status = response.status();

		if !status.is_success() {
			return Err(refresh_failed(
				common::body_preview(response.body()),
				Some(status.as_u16()),
			));
		}

		let grant = common::decode_json::<TokenGrant>(status, response.body()).map_err(
			|ResponseError::Parse { source, status }| {
				refresh_failed(
					format_args!("malformed token response at `{}`", source.path()),
					Some(status),
				)
			},
		)?;
		let tokens = grant.into_tokens().ok_or(SessionError::MissingAccessToken)?;

		self.tokens.save(&tokens).await.map_err(storage)?;

		Ok(tokens.access_token)
	}

	async fn release(&self, generation: u64) {
		let mut slot = self.slot.in_flight.lock().await;

		if slot.as_ref().is_some_and(|in_flight| in_flight.generation == generation) {
			*slot = None;
		}
	}
}

fn refresh_failed(reason: impl Display, status: Option<u16>) -> SessionError {
	SessionError::RefreshFailed { reason: reason.to_string(), status }
}

fn storage(err: StoreError) -> SessionError {
	SessionError::Storage { reason: err.to_string() }
}
