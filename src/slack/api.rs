//! Type definitions and helpers for the Slack API.

use super::{auth::*, error::SlackError};
use reqwest::{RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

/// The base URL of the Slack API.
pub const API_BASE: &str = "https://slack.com/api";

/// A reusable client that holds a connection pool internally, as per
/// [reqwest::Client].
///
/// The base URL is held rather than hardcoded so that tests can stand a mock
/// server in for Slack.
pub struct SlackClient {
    http: reqwest::Client,
    base: String,
}

impl SlackClient {
    pub fn new(base: String) -> Self {
        SlackClient {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_owned(),
        }
    }

    /// Create a GET request to any Slack API endpoint, handling authentication.
    pub(super) fn get<T: ToString>(&self, path: T, token: &SlackAccessToken) -> RequestBuilder {
        self.http
            .get(self.base.to_owned() + &path.to_string())
            .header(reqwest::header::AUTHORIZATION, to_auth_header_val(token))
    }

    /// Create a POST request to any Slack API endpoint, handling authentication.
    pub(super) fn post<T: ToString>(&self, path: T, token: &SlackAccessToken) -> RequestBuilder {
        self.http
            .post(self.base.to_owned() + &path.to_string())
            .header(reqwest::header::AUTHORIZATION, to_auth_header_val(token))
    }
}

/// Send a request, returning Slack's JSON body verbatim provided that the HTTP
/// status was `200 OK`.
///
/// Slack reports most failures with a `200` and `"ok": false`, so the body is
/// kept as a [Value] here and only interpreted by [parse]. Callers that need
/// to persist the raw response can do so in between.
pub(super) async fn send(req: RequestBuilder) -> Result<Value, SlackError> {
    let res = req.send().await?;

    let status = res.status();
    if status != StatusCode::OK {
        return Err(SlackError::UnexpectedStatus(status));
    }

    let bytes = res.bytes().await?;
    serde_json::from_slice(&bytes).map_err(SlackError::MalformedResponse)
}

/// The universal response in case of an unsuccessful request.
///
/// ```json
/// {
///     "ok": false,
///     "error": "invalid_auth"
/// }
/// ```
#[derive(Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

/// Interpret a Slack response body as `T`, which is only attempted if `ok` is
/// exactly `true`. A missing or non-boolean `ok` counts as a failure.
// `ok` would ideally act as a serde tag here, however serde only supports
// string tags, hence the manual dispatch.
pub fn parse<T: DeserializeOwned>(body: Value) -> Result<T, SlackError> {
    if body.get("ok").and_then(Value::as_bool) != Some(true) {
        return Err(match serde_json::from_value::<ErrorResponse>(body) {
            Ok(ErrorResponse { error: Some(e) }) => SlackError::APIResponseError(e),
            _ => SlackError::APIResponseMissingError,
        });
    }

    serde_json::from_value(body).map_err(SlackError::MalformedResponse)
}
