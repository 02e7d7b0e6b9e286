//! Shared helpers for flow implementations (status mapping, JSON decoding, body previews).

// crates.io
use http::StatusCode;
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::ResponseError, transport::HttpResponse};

const MAX_ERROR_BODY_LEN: usize = 500;

/// Decodes a JSON body with path-aware errors.
pub(crate) fn decode_json<T>(status: StatusCode, body: &[u8]) -> Result<T, ResponseError>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| ResponseError::Parse { source, status: status.as_u16() })
}

/// Passes 2xx responses through and maps everything else to an [`Error`].
///
/// A 401 reaching this point has already been through the refresh flow once.
pub(crate) fn check_status(response: HttpResponse) -> Result<HttpResponse> {
	let status = response.status();

	if status.is_success() {
		return Ok(response);
	}
	if status == StatusCode::UNAUTHORIZED {
		return Err(Error::Unauthorized);
	}

	Err(api_error(&response))
}

/// Builds [`Error::Api`] from a non-success response.
pub(crate) fn api_error(response: &HttpResponse) -> Error {
	Error::Api { status: response.status().as_u16(), message: body_preview(response.body()) }
}

/// Renders a body for error messages, truncated on a character boundary.
pub(crate) fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	if text.len() <= MAX_ERROR_BODY_LEN {
		return text.into_owned();
	}

	let mut end = MAX_ERROR_BODY_LEN;

	while !text.is_char_boundary(end) {
		end -= 1;
	}

	format!("{}... (truncated, {} total bytes)", &text[..end], body.len())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, body: &str) -> HttpResponse {
		http::Response::builder()
			.status(status)
			.body(body.as_bytes().to_vec())
			.expect("Response fixture should build.")
	}

	#[test]
	fn check_status_maps_failures() {
		assert!(check_status(response(204, "")).is_ok());
		assert!(matches!(check_status(response(401, "")), Err(Error::Unauthorized)));

		let err = check_status(response(500, "boom")).expect_err("5xx should fail.");

		assert!(matches!(err, Error::Api { status: 500, ref message } if message == "boom"));
	}

	#[test]
	fn body_preview_truncates_on_char_boundary() {
		let body = "é".repeat(400);
		let preview = body_preview(body.as_bytes());

		assert!(preview.ends_with("(truncated, 800 total bytes)"));
		assert!(preview.starts_with("éé"));
	}

	#[test]
	fn decode_json_reports_the_failing_path() {
		#[derive(Debug, Deserialize)]
		struct Payload {
			#[allow(dead_code)]
			status: i64,
		}

		let err = decode_json::<Payload>(StatusCode::OK, br#"{"status":"nope"}"#)
			.expect_err("Type mismatch should fail.");
		let ResponseError::Parse { source, status } = err;

		assert_eq!(status, 200);
		assert_eq!(source.path().to_string(), "status");
	}
}
