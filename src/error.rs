//! Error types surfaced by a test request.
//!
//! # Design Decisions
//! - One crate-wide error; every failure rejects the awaited request
//! - Each variant maps to a stable string code so tests can match on kind
//! - Nothing is retried; callers re-issue a fresh request instead

use thiserror::Error;

use crate::assertions::AssertionError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can abort a test request.
#[derive(Debug, Error)]
pub enum Error {
    /// The exchange failed on the wire (reset, refused, timeout, bad framing).
    #[error("{message}")]
    Transport {
        code: &'static str,
        url: String,
        message: String,
    },

    /// More redirect hops were required than the configured cap.
    #[error("Redirected {max} times. Aborting.")]
    TooManyRedirects { max: u32, url: String },

    /// A queued expectation did not hold.
    #[error(transparent)]
    Assertion(#[from] AssertionError),

    /// The request cannot run (e.g. it has no execution target).
    #[error("{0}")]
    Misuse(String),

    /// The resolved URL or a redirect location could not be parsed.
    #[error("Invalid URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },

    /// A header name or value was rejected.
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    /// The request or response body could not be (de)serialized.
    #[error("Body parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The ephemeral server for an in-process handler failed to start.
    #[error("Server error: {0}")]
    Server(#[source] std::io::Error),

    /// Target resolution lacked required configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Stable code describing the failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Transport { code, .. } => code,
            Error::TooManyRedirects { .. } => "ERR_TOO_MANY_REDIRECTS",
            Error::Assertion(_) => "ERR_ASSERTION",
            Error::Misuse(_) => "ERR_MISUSE",
            Error::InvalidUrl { .. } => "ERR_INVALID_URL",
            Error::InvalidHeader { .. } => "ERR_INVALID_HEADER",
            Error::Parse(_) => "ERR_BODY_PARSE_FAILURE",
            Error::Server(_) => "ERR_SERVER",
            Error::Config(_) => "ERR_CONFIG",
        }
    }

    /// Returns the assertion failure, if that is what this error is.
    pub fn as_assertion(&self) -> Option<&AssertionError> {
        match self {
            Error::Assertion(e) => Some(e),
            _ => None,
        }
    }

    /// An equivalent error for reporting the same failure again.
    pub(crate) fn duplicate(&self) -> Self {
        match self {
            Error::Transport { code, url, message } => Error::Transport {
                code: *code,
                url: url.clone(),
                message: message.clone(),
            },
            Error::TooManyRedirects { max, url } => Error::TooManyRedirects {
                max: *max,
                url: url.clone(),
            },
            Error::Assertion(e) => Error::Assertion(e.clone()),
            Error::Misuse(m) => Error::Misuse(m.clone()),
            Error::InvalidUrl { input, reason } => Error::invalid_url(input.as_str(), reason),
            Error::InvalidHeader { name, reason } => Error::invalid_header(name.as_str(), reason),
            Error::Parse(e) => Error::Parse(serde::ser::Error::custom(e)),
            Error::Server(e) => Error::Server(std::io::Error::new(e.kind(), e.to_string())),
            Error::Config(m) => Error::Config(m.clone()),
        }
    }

    pub(crate) fn invalid_url(input: impl Into<String>, reason: impl ToString) -> Self {
        Error::InvalidUrl {
            input: input.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid_header(name: impl Into<String>, reason: impl ToString) -> Self {
        Error::InvalidHeader {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct_per_kind() {
        let redirect = Error::TooManyRedirects {
            max: 3,
            url: "http://127.0.0.1/".into(),
        };
        let reset = Error::Transport {
            code: "ECONNRESET",
            url: "http://127.0.0.1/".into(),
            message: "socket hang up".into(),
        };
        assert_eq!(redirect.code(), "ERR_TOO_MANY_REDIRECTS");
        assert_eq!(reset.code(), "ECONNRESET");
        assert_eq!(reset.to_string(), "socket hang up");
    }

    #[test]
    fn test_duplicate_keeps_code_and_message() {
        let parse = Error::Parse(serde::ser::Error::custom("key must be a string"));
        let again = parse.duplicate();
        assert_eq!(again.code(), "ERR_BODY_PARSE_FAILURE");
        assert_eq!(again.to_string(), parse.to_string());

        let server = Error::Server(std::io::Error::from(std::io::ErrorKind::AddrInUse));
        assert_eq!(server.duplicate().code(), "ERR_SERVER");
    }

    #[test]
    fn test_assertion_display_is_message() {
        let err: Error = AssertionError::new("unexpected status code", "200", Some("404".into())).into();
        assert_eq!(err.to_string(), "unexpected status code");
        assert_eq!(err.code(), "ERR_ASSERTION");
        assert!(err.as_assertion().is_some());
    }
}
