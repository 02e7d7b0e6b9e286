//! Question catalog lookups.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	api::Identifier,
	flows::{ApiClient, ApiRequest},
	transport::ApiHttpClient,
};

/// Borrowed view of an [`ApiClient`] exposing question operations.
pub struct QuestionApi<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	pub(crate) client: &'a ApiClient<C>,
}
impl<C> QuestionApi<'_, C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Searches the catalog with caller-supplied filter and paging parameters.
	pub async fn search<P>(&self, params: &P) -> Result<Value>
	where
		P: ?Sized + Serialize,
	{
		self.client.send_json(ApiRequest::post("/app/question/search").json(params)?).await
	}

	/// Fetches one question, including its statement and available databases.
	pub async fn detail(&self, id: impl Into<Identifier>) -> Result<Value> {
		self.client.send_json(ApiRequest::get("/app/question").segment(id.into())).await
	}
}
