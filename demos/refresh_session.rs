//! Demonstrates a session surviving an access-token rotation: three concurrent requests hit a 401,
//! one refresh exchange runs, and every request is replayed with the new token.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use sql_practice_client::{
	api::QueryRun,
	auth::SessionTokens,
	config::ClientConfig,
	ext::RecordingObserver,
	flows::ReqwestApiClient,
	store::{KeyValueStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/app/executor/user")
				.header("authorization", "Bearer stale");
			then.status(401);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/app/executor/user")
				.header("authorization", "Bearer fresh");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"status":1,"result":[{"answer":42}],"timeExec":"0.003"}"#);
		})
		.await;

	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/auth/refresh-token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"fresh","refresh_token":"rotated"}"#);
		})
		.await;
	let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());
	let config = ClientConfig::builder(Url::parse(&server.url("/api"))?).build()?;
	let observer = RecordingObserver::default();
	let client = ReqwestApiClient::new(store, config)?.with_observer(Arc::new(observer.clone()));

	client.tokens.save(&SessionTokens::new("stale").with_refresh("original")).await?;

	let run = QueryRun::new(1, "select 42 as answer", 1);
	let executor = client.executor();
	let (a, b, c) =
		tokio::join!(executor.dry_run(&run), executor.dry_run(&run), executor.dry_run(&run));

	for outcome in [a?, b?, c?] {
		println!("Rows: {} in {:?}s.", outcome.result, outcome.time_exec);
	}

	println!("Refresh metrics: {:?}.", client.refresh_metrics());
	println!("Session events: {:?}.", observer.events());

	refresh.assert_calls_async(1).await;

	Ok(())
}
