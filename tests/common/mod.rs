//! Shared fixtures for reqwest-backed integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use httpmock::MockServer;
use time::{Duration, OffsetDateTime};
use url::Url;
// self
use sql_practice_client::{
	auth::SessionTokens,
	config::ClientConfig,
	ext::RecordingObserver,
	flows::ReqwestApiClient,
	store::{KeyValueStore, MemoryStore, SessionStore},
};

/// Client wired to a mock server, plus handles to inspect its side effects.
pub struct Harness {
	pub client: ReqwestApiClient,
	pub store: MemoryStore,
	pub observer: RecordingObserver,
}

/// Configuration rooted at `/api` on the mock server.
pub fn config(server: &MockServer) -> ClientConfig {
	ClientConfig::builder(
		Url::parse(&server.url("/api")).expect("Mock server base URL should parse."),
	)
	.build()
	.expect("Client configuration fixture should validate.")
}

/// Builds a client against `server` with `tokens` already stored.
pub async fn harness(server: &MockServer, tokens: Option<SessionTokens>) -> Harness {
	harness_with_config(config(server), tokens).await
}

/// Builds a client from `config` with `tokens` already stored.
pub async fn harness_with_config(config: ClientConfig, tokens: Option<SessionTokens>) -> Harness {
	let store = MemoryStore::default();
	let backend: Arc<dyn KeyValueStore> = Arc::new(store.clone());

	if let Some(tokens) = tokens {
		SessionStore::new(backend.clone(), config.storage_keys.clone())
			.save(&tokens)
			.await
			.expect("Seeding the token pair should succeed.");
	}

	let observer = RecordingObserver::default();
	let client = ReqwestApiClient::new(backend, config)
		.expect("Client fixture should build.")
		.with_observer(Arc::new(observer.clone()));

	Harness { client, store, observer }
}

/// Unsigned JWT carrying `payload`.
pub fn jwt(payload: &str) -> String {
	let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
	let body = URL_SAFE_NO_PAD.encode(payload);

	format!("{header}.{body}.signature")
}

/// JWT for `user_id` that expires in an hour.
pub fn user_jwt(user_id: &str) -> String {
	let exp = (OffsetDateTime::now_utc() + Duration::hours(1)).unix_timestamp();

	jwt(&format!(r#"{{"exp":{exp},"userId":{user_id}}}"#))
}
