//! Core request, response, and outcome types

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A fully-formed HTTP request handed to a [`Transport`](crate::transport::Transport).
///
/// Bare URL strings are the other accepted request form; transports that support
/// them implement `Transport<String>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    /// HTTP method (e.g. "GET", "POST")
    pub method: String,
    /// Absolute request URL
    pub url: String,
    /// Request headers in insertion order
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Request body (empty for bodiless methods)
    #[serde(default)]
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Create a request with an arbitrary method
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Create a POST request with a body
    pub fn post(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            ..Self::new("POST", url)
        }
    }

    /// Append a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl From<&str> for HttpRequest {
    fn from(url: &str) -> Self {
        Self::get(url)
    }
}

/// A response returned by a transport
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers in the order received
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Buffered response body
    #[serde(default)]
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create an empty response with the given status
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Replace the body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Append a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header value matching `name`, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Result of processing one request: exactly one of a validated response or an error.
///
/// A response rejected by a validator is dropped; only the validation error survives.
#[derive(Debug)]
pub enum Outcome {
    /// The transport returned a response and every validator accepted it
    Success(HttpResponse),
    /// The transport failed or a validator rejected the response
    Failure(Error),
}

impl Outcome {
    /// True for [`Outcome::Success`]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Convert into a plain `Result`
    pub fn into_result(self) -> Result<HttpResponse> {
        match self {
            Outcome::Success(response) => Ok(response),
            Outcome::Failure(error) => Err(error),
        }
    }
}

impl From<Result<HttpResponse>> for Outcome {
    fn from(result: Result<HttpResponse>) -> Self {
        match result {
            Ok(response) => Outcome::Success(response),
            Err(error) => Outcome::Failure(error),
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let response = HttpResponse::new(200)
            .with_header("Content-Type", "text/plain")
            .with_header("X-Trace", "abc");

        assert_eq!(response.header("content-type"), Some("text/plain"));
        assert_eq!(response.header("X-TRACE"), Some("abc"));
        assert_eq!(response.header("missing"), None);
    }

    #[test]
    fn is_success_covers_2xx_only() {
        assert!(HttpResponse::new(200).is_success());
        assert!(HttpResponse::new(204).is_success());
        assert!(!HttpResponse::new(199).is_success());
        assert!(!HttpResponse::new(301).is_success());
        assert!(!HttpResponse::new(404).is_success());
    }

    #[test]
    fn text_replaces_invalid_utf8() {
        let response = HttpResponse::new(200).with_body(vec![b'o', b'k', 0xff]);
        assert_eq!(response.text(), "ok\u{fffd}");
    }

    #[test]
    fn post_carries_body_and_method() {
        let request = HttpRequest::post("https://example.com/items", "{}")
            .with_header("Content-Type", "application/json");

        assert_eq!(request.method, "POST");
        assert_eq!(request.body, b"{}".to_vec());
        assert_eq!(request.headers.len(), 1);
    }

    #[test]
    fn outcome_never_carries_both() {
        let ok: Outcome = Ok(HttpResponse::new(200)).into();
        assert!(ok.is_success());
        assert_eq!(ok.into_result().unwrap().status, 200);

        let failed: Outcome = Err(Error::InvalidStatus { status: 500 }).into();
        assert!(!failed.is_success());
        assert!(failed.into_result().unwrap_err().is_validation());
    }

    #[test]
    fn request_deserializes_with_default_headers_and_body() {
        let request: HttpRequest =
            serde_json::from_str(r#"{"method": "GET", "url": "https://example.com"}"#).unwrap();

        assert_eq!(request, HttpRequest::get("https://example.com"));
    }
}
