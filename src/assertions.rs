//! Ordered expectations checked against a settled response.
//!
//! # Design Decisions
//! - Expectations run in the order they were queued
//! - The first failure stops the run; later expectations are never evaluated
//! - Header names compare case-insensitively; a pattern wins over exact text

use axum::http::StatusCode;
use regex::Regex;

use crate::response::TestResponse;

/// How a header value is compared.
#[derive(Debug, Clone)]
pub enum HeaderMatch {
    Exact(String),
    Pattern(Regex),
}

impl HeaderMatch {
    fn matches(&self, actual: Option<&str>) -> bool {
        match (self, actual) {
            (HeaderMatch::Exact(expected), Some(actual)) => expected == actual,
            (HeaderMatch::Pattern(re), Some(actual)) => re.is_match(actual),
            (_, None) => false,
        }
    }

    fn describe(&self) -> String {
        match self {
            HeaderMatch::Exact(s) => s.clone(),
            HeaderMatch::Pattern(re) => format!("/{}/", re.as_str()),
        }
    }
}

impl From<&str> for HeaderMatch {
    fn from(s: &str) -> Self {
        HeaderMatch::Exact(s.to_string())
    }
}

impl From<String> for HeaderMatch {
    fn from(s: String) -> Self {
        HeaderMatch::Exact(s)
    }
}

impl From<Regex> for HeaderMatch {
    fn from(re: Regex) -> Self {
        HeaderMatch::Pattern(re)
    }
}

/// A pending check on the response.
#[derive(Debug, Clone)]
pub enum Expectation {
    Status(u16),
    Header { name: String, expected: HeaderMatch },
}

impl Expectation {
    pub fn header(name: impl Into<String>, expected: impl Into<HeaderMatch>) -> Self {
        Expectation::Header {
            name: name.into().to_ascii_lowercase(),
            expected: expected.into(),
        }
    }

    /// Check this expectation against a response.
    pub fn check(&self, response: &TestResponse) -> Result<(), AssertionError> {
        match self {
            Expectation::Status(expected) => {
                let actual = response.status_code();
                if actual == *expected {
                    Ok(())
                } else {
                    Err(AssertionError::new(
                        "unexpected status code",
                        expected.to_string(),
                        Some(actual.to_string()),
                    ))
                }
            }
            Expectation::Header { name, expected } => {
                let name = name.to_ascii_lowercase();
                let actual = response.header(&name);
                if expected.matches(actual.as_deref()) {
                    Ok(())
                } else {
                    Err(AssertionError::new(
                        format!("unexpected header {}", name),
                        expected.describe(),
                        actual,
                    ))
                }
            }
        }
    }
}

impl From<u16> for Expectation {
    fn from(status: u16) -> Self {
        Expectation::Status(status)
    }
}

/// Lets bare integer literals like `expect(200)` resolve. Out-of-range codes never match.
impl From<i32> for Expectation {
    fn from(status: i32) -> Self {
        Expectation::Status(u16::try_from(status).unwrap_or(u16::MAX))
    }
}

impl From<StatusCode> for Expectation {
    fn from(status: StatusCode) -> Self {
        Expectation::Status(status.as_u16())
    }
}

impl<N: Into<String>, M: Into<HeaderMatch>> From<(N, M)> for Expectation {
    fn from((name, expected): (N, M)) -> Self {
        Expectation::header(name, expected)
    }
}

/// A failed expectation. Displays as its message alone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AssertionError {
    message: String,
    expected: String,
    actual: Option<String>,
}

impl AssertionError {
    pub fn new(message: impl Into<String>, expected: impl Into<String>, actual: Option<String>) -> Self {
        Self {
            message: message.into(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn actual(&self) -> Option<&str> {
        self.actual.as_deref()
    }
}

/// Run queued expectations in order, stopping at the first failure.
pub fn run(pending: Vec<Expectation>, response: &TestResponse) -> Result<(), AssertionError> {
    for expectation in pending {
        if let Err(e) = expectation.check(response) {
            tracing::debug!(
                message = %e.message,
                expected = %e.expected,
                actual = ?e.actual,
                "Expectation failed"
            );
            return Err(e);
        }
    }
    Ok(())
}
