//! Query dry-runs, graded submissions, and submission status lookups.

// crates.io
use serde::Deserializer;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	api::Identifier,
	flows::{ApiClient, ApiRequest},
	transport::ApiHttpClient,
};

const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// SQL run against one question's database.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRun {
	/// Question the query answers.
	pub question_id: Identifier,
	/// SQL text.
	pub sql: String,
	/// Database engine the query targets.
	pub type_database_id: Identifier,
}
impl QueryRun {
	/// Creates a run for the provided question, SQL text, and database engine.
	pub fn new(
		question_id: impl Into<Identifier>,
		sql: impl Into<String>,
		type_database_id: impl Into<Identifier>,
	) -> Self {
		Self {
			question_id: question_id.into(),
			sql: sql.into(),
			type_database_id: type_database_id.into(),
		}
	}
}

/// Outcome of a dry run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
	/// `1` on success; anything else is an execution error.
	#[serde(default)]
	pub status: i64,
	/// Result rows on success, error details otherwise.
	#[serde(default)]
	pub result: Value,
	/// Execution time in seconds.
	#[serde(default, deserialize_with = "lenient_seconds")]
	pub time_exec: Option<f64>,
}
impl ExecutionResult {
	/// Returns `true` when the query ran successfully.
	pub fn is_success(&self) -> bool {
		self.status == 1
	}

	/// Error message for a failed run, `None` on success.
	///
	/// Prefers the error object's `description`, then a plain string result, then the JSON
	/// rendering of whatever upstream sent.
	pub fn error_message(&self) -> Option<String> {
		if self.is_success() {
			return None;
		}

		let message = match &self.result {
			Value::Null => UNKNOWN_ERROR.to_owned(),
			Value::String(text) => text.clone(),
			Value::Object(object) => match object.get("description") {
				Some(Value::String(description)) if !description.is_empty() =>
					description.clone(),
				_ => self.result.to_string(),
			},
			other => other.to_string(),
		};

		Some(message)
	}
}

/// Grading verdict reported for a submission.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
	/// `AC`.
	Accepted,
	/// `WA`.
	WrongAnswer,
	/// `TLE`.
	TimeLimitExceeded,
	/// `RTE`.
	RuntimeError,
	/// `CE`.
	CompilationError,
	/// `PENDING`, `QUEUE`, or no status yet.
	Pending,
	/// Any other status string.
	Other(String),
}
impl Verdict {
	/// Parses an upstream status string.
	pub fn from_status(status: &str) -> Self {
		match status {
			"AC" => Self::Accepted,
			"WA" => Self::WrongAnswer,
			"TLE" => Self::TimeLimitExceeded,
			"RTE" => Self::RuntimeError,
			"CE" => Self::CompilationError,
			"" | "PENDING" | "QUEUE" => Self::Pending,
			other => Self::Other(other.to_owned()),
		}
	}

	/// Human-readable verdict.
	pub fn message(&self) -> &str {
		match self {
			Self::Accepted => "Accepted!",
			Self::WrongAnswer => "Wrong Answer",
			Self::TimeLimitExceeded => "Time Limit Exceeded",
			Self::RuntimeError => "Runtime Error",
			Self::CompilationError => "Compilation Error",
			Self::Pending => "Still processing...",
			Self::Other(status) => status.as_str(),
		}
	}
}

/// Grading state of one question for the current user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStatus {
	/// Question the status refers to.
	pub question_id: Identifier,
	/// Raw verdict string.
	#[serde(default)]
	pub status: String,
	/// `"done"` once grading finished.
	#[serde(default)]
	pub completed: Option<String>,
}
impl CompletionStatus {
	/// Returns `true` once grading has finished.
	pub fn is_done(&self) -> bool {
		self.completed.as_deref() == Some("done")
	}

	/// Parsed verdict.
	pub fn verdict(&self) -> Verdict {
		Verdict::from_status(&self.status)
	}
}

/// Page of submission history for one question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryQuery {
	/// Question to list submissions for.
	pub question_id: Identifier,
	/// Zero-based page index.
	pub page: u32,
	/// Page size.
	pub size: u32,
}
impl HistoryQuery {
	const DEFAULT_SIZE: u32 = 10;

	/// First page of the default size.
	pub fn new(question_id: impl Into<Identifier>) -> Self {
		Self { question_id: question_id.into(), page: 0, size: Self::DEFAULT_SIZE }
	}

	/// Selects a page.
	pub fn page(mut self, page: u32) -> Self {
		self.page = page;

		self
	}

	/// Overrides the page size.
	pub fn size(mut self, size: u32) -> Self {
		self.size = size;

		self
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionCheck<'a> {
	question_ids: &'a [Identifier],
	user_id: &'a Identifier,
}

/// Borrowed view of an [`ApiClient`] exposing executor operations.
pub struct ExecutorApi<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	pub(crate) client: &'a ApiClient<C>,
}
impl<C> ExecutorApi<'_, C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Runs `run` without grading it.
	pub async fn dry_run(&self, run: &QueryRun) -> Result<ExecutionResult> {
		self.client.send_json(ApiRequest::post("/app/executor/user").json(run)?).await
	}

	/// Queues `run` for grading. Poll [`ExecutorApi::completion_of`] for the verdict.
	///
	/// Returns the response body, or `None` when upstream sent none.
	pub async fn submit(&self, run: &QueryRun) -> Result<Option<Value>> {
		self.client.send_optional_json(ApiRequest::post("/app/executor/submit").json(run)?).await
	}

	/// Looks up grading state for several questions at once.
	pub async fn check_complete<I>(&self, question_ids: I) -> Result<Vec<CompletionStatus>>
	where
		I: IntoIterator,
		I::Item: Into<Identifier>,
	{
		let user_id = self.client.current_user_id().await?;
		let question_ids = question_ids.into_iter().map(Into::into).collect::<Vec<_>>();
		let request = ApiRequest::post("/app/submit-history/check/complete")
			.json(&CompletionCheck { question_ids: &question_ids, user_id: &user_id })?;

		self.client.send_json(request).await
	}

	/// Grading state of a single question, `None` when upstream has no record of it.
	pub async fn completion_of(
		&self,
		question_id: impl Into<Identifier>,
	) -> Result<Option<CompletionStatus>> {
		let question_id = question_id.into();
		let statuses = self.check_complete([question_id.clone()]).await?;

		Ok(statuses.into_iter().find(|status| status.question_id == question_id))
	}

	/// Lists the current user's submissions for one question.
	pub async fn history(&self, query: &HistoryQuery) -> Result<Value> {
		let user_id = self.client.current_user_id().await?;
		let request = ApiRequest::get("/app/submit-history/user")
			.segment(user_id)
			.query("questionId", &query.question_id)
			.query("page", query.page)
			.query("size", query.size);

		self.client.send_json(request).await
	}
}

fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match Value::deserialize(deserializer)? {
		Value::Number(number) => number.as_f64(),
		Value::String(text) => text.trim().parse().ok(),
		_ => None,
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn execution_result_reads_success_and_errors() {
		let ok: ExecutionResult =
			serde_json::from_str(r#"{"status":1,"result":[{"a":1}],"timeExec":"0.25"}"#)
				.expect("Success fixture should parse.");

		assert!(ok.is_success());
		assert_eq!(ok.time_exec, Some(0.25));
		assert_eq!(ok.error_message(), None);

		let described: ExecutionResult = serde_json::from_str(
			r#"{"status":0,"result":{"description":"syntax error near FROM","code":42}}"#,
		)
		.expect("Error fixture should parse.");

		assert_eq!(described.error_message().as_deref(), Some("syntax error near FROM"));

		let bare: ExecutionResult =
			serde_json::from_str(r#"{"status":-1}"#).expect("Bare fixture should parse.");

		assert_eq!(bare.error_message().as_deref(), Some("Unknown error occurred"));

		let opaque: ExecutionResult = serde_json::from_str(r#"{"status":0,"result":{"code":42}}"#)
			.expect("Opaque fixture should parse.");

		assert_eq!(opaque.error_message().as_deref(), Some(r#"{"code":42}"#));
	}

	#[test]
	fn completion_status_parses_verdicts() {
		let statuses: Vec<CompletionStatus> = serde_json::from_str(
			r#"[{"questionId":3,"status":"TLE","completed":"done"},{"questionId":"q4","status":"QUEUE"}]"#,
		)
		.expect("Status fixture should parse.");

		assert!(statuses[0].is_done());
		assert_eq!(statuses[0].verdict(), Verdict::TimeLimitExceeded);
		assert_eq!(statuses[0].verdict().message(), "Time Limit Exceeded");
		assert!(!statuses[1].is_done());
		assert_eq!(statuses[1].verdict(), Verdict::Pending);
		assert_eq!(Verdict::from_status("MLE").message(), "MLE");
	}

	#[test]
	fn query_run_uses_camel_case() {
		let run = QueryRun::new(5, "select 1", 2);

		assert_eq!(
			serde_json::to_value(&run).expect("Run should encode."),
			serde_json::json!({ "questionId": 5, "sql": "select 1", "typeDatabaseId": 2 })
		);
		assert_eq!(
			HistoryQuery::new(5).page(2),
			HistoryQuery { question_id: 5.into(), page: 2, size: 10 }
		);
	}
}
