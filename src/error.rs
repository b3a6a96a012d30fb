//! Error types
//!
//! Every failure the crate can report is a variant of [`Error`]. Nothing is
//! retried or swallowed internally: the operation that detects a failure
//! returns it to its immediate caller.

use serde_json::Value;
use std::fmt;

/// Maximum length of a response body kept in error messages
const MAX_BODY_IN_MESSAGE: usize = 200;

/// Opaque error produced by a [`Transport`](crate::weibo::http::Transport)
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while fetching or reading Weibo data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A facade was built over a scalar instead of a mapping or sequence.
    #[error("cannot wrap a JSON {kind}, expected an object or an array")]
    InvalidJsonKind { kind: &'static str },

    /// Key lookup on a mapping missed.
    #[error("field `{field}` not found at `{path}`")]
    MissingField { path: String, field: String },

    /// Index lookup on a sequence was out of bounds.
    #[error("index {index} out of range at `{path}` (length {len})")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    /// Mapping-style access on a sequence or the other way round.
    #[error("`{operation}` is not supported on a JSON {kind}")]
    UnsupportedOperation {
        operation: &'static str,
        kind: &'static str,
    },

    /// The server replied with something that is not the expected JSON.
    #[error(transparent)]
    Decode(#[from] UnexpectedResponse),

    /// The transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),

    /// A non-positive page number was requested.
    #[error("invalid page number {page}, pages start at 1")]
    InvalidPage { page: i64 },

    /// No resource type is registered under this name.
    #[error("unknown weibo object type [{name}]")]
    UnknownResourceType { name: String },

    /// An object id was neither a string nor an integer.
    #[error("invalid id for {kind}: expected a string or integer, got {found}")]
    InvalidId { kind: &'static str, found: String },

    /// The operation needs a logged-in session.
    #[error("need login to use the [{operation}] method")]
    AuthenticationRequired { operation: String },
}

impl Error {
    /// Wrap any transport-level failure.
    pub fn transport(err: impl Into<TransportError>) -> Self {
        Error::Transport(err.into())
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode(_))
    }
}

/// The server answered, but not with what the caller expected.
///
/// Carries the request URL, the HTTP status, the raw body and a short
/// description of the expected shape. When the body is JSON with an
/// `error.message` member, that message becomes the [`reason`](Self::reason).
#[derive(Debug, Clone)]
pub struct UnexpectedResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
    pub expect: &'static str,
    pub reason: Option<String>,
}

impl UnexpectedResponse {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>, expect: &'static str) -> Self {
        let body = body.into();
        let reason = upstream_message(&body);
        Self {
            url: url.into(),
            status,
            body,
            expect,
            reason,
        }
    }
}

impl fmt::Display for UnexpectedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(reason) = &self.reason {
            return write!(f, "an error happened when getting data: {}", reason);
        }
        write!(
            f,
            "unknown error! unexpected response (status {}) from [{}], expected [{}], body: {}",
            self.status,
            self.url,
            self.expect,
            truncate_body(&self.body, MAX_BODY_IN_MESSAGE)
        )
    }
}

impl std::error::Error for UnexpectedResponse {}

/// Extract `error.message` from a JSON error body
fn upstream_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}

/// Cut `body` to at most `max` bytes on a char boundary, noting the full size
pub(crate) fn truncate_body(body: &str, max: usize) -> String {
    if body.len() <= max {
        return body.to_string();
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_response_mentions_url_and_expectation() {
        let err = UnexpectedResponse::new("https://test.com", 200, "not json at all", "a JSON object");
        let msg = err.to_string();
        assert!(msg.contains("https://test.com"));
        assert!(msg.contains("a JSON object"));
        assert!(msg.to_lowercase().contains("unknown error"));
        assert!(err.reason.is_none());
    }

    #[test]
    fn test_upstream_error_message_becomes_reason() {
        let body = r#"{"error": {"message": "rate limited"}}"#;
        let err = UnexpectedResponse::new("https://test.com", 418, body, "a JSON object");
        assert_eq!(err.reason.as_deref(), Some("rate limited"));
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn test_error_without_message_stays_unknown() {
        let err = UnexpectedResponse::new("https://test.com", 500, r#"{"error": {"code": 500}}"#, "data");
        assert!(err.reason.is_none());
    }

    #[test]
    fn test_long_body_is_truncated_on_char_boundary() {
        let body = "微".repeat(300);
        let err = UnexpectedResponse::new("u", 200, body.clone(), "data");
        let msg = err.to_string();
        assert!(msg.contains("truncated"));
        assert_eq!(err.body, body);
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short", 10), "short");
        let cut = truncate_body(&"微".repeat(10), 10);
        assert!(cut.starts_with("微微微... [truncated, 30 bytes total]"));
        assert_eq!(truncate_body(&"x".repeat(12), 10), "xxxxxxxxxx... [truncated, 12 bytes total]");
    }

    #[test]
    fn test_authentication_required_names_operation() {
        let err = Error::AuthenticationRequired {
            operation: "post_status".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("post_status"));
        assert!(msg.contains("login"));
    }

    #[test]
    fn test_decode_errors_are_transparent() {
        let err: Error = UnexpectedResponse::new("u", 200, r#"{"error":{"message":"boom"}}"#, "data").into();
        assert!(err.is_decode());
        assert!(err.to_string().contains("boom"));
    }
}
