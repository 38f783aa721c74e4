//! The settled response handed to expectations and to the caller.
//!
//! # Design Decisions
//! - Immutable once built
//! - The raw body is always kept; `text()` decodes lazily and is absent for HEAD
//! - `body()` is either parsed JSON (when requested) or text

use std::borrow::Cow;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::error::Result;
use crate::transport::RawResponse;

/// Derived view of the response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Empty,
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A completed exchange.
#[derive(Debug, Clone)]
pub struct TestResponse {
    request_id: Uuid,
    method: Method,
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    redirect_urls: Vec<Url>,
    raw: Bytes,
    body: ResponseBody,
}

impl TestResponse {
    pub(crate) fn from_raw(request_id: Uuid, method: Method, raw: RawResponse, wants_json: bool) -> Result<Self> {
        let body = if method == Method::HEAD || raw.body.is_empty() {
            ResponseBody::Empty
        } else if wants_json {
            ResponseBody::Json(serde_json::from_slice(&raw.body)?)
        } else {
            ResponseBody::Text(String::from_utf8_lossy(&raw.body).into_owned())
        };

        Ok(Self {
            request_id,
            method,
            status: raw.status,
            headers: raw.headers,
            url: raw.url,
            redirect_urls: raw.redirect_urls,
            raw: raw.body,
            body,
        })
    }

    /// Correlates with the `request_id` field in trace output.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value by case-insensitive name; repeated headers are joined with `, `.
    pub fn header(&self, name: &str) -> Option<String> {
        let mut values = self
            .headers
            .get_all(name.to_ascii_lowercase().as_str())
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .peekable();
        values.peek()?;
        Some(values.collect::<Vec<_>>().join(", "))
    }

    /// URL of the final hop.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Every URL redirected to, in order.
    pub fn redirect_urls(&self) -> &[Url] {
        &self.redirect_urls
    }

    pub fn raw_body(&self) -> &Bytes {
        &self.raw
    }

    /// The body decoded as text. `None` for HEAD requests.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        if self.method == Method::HEAD {
            return None;
        }
        Some(String::from_utf8_lossy(&self.raw))
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Deserialize the raw body as JSON, regardless of the `json()` toggle.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.raw)?)
    }

    #[cfg(test)]
    pub(crate) fn for_test(method: Method, status: u16, headers: HeaderMap, body: &str) -> Self {
        let raw = RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers,
            body: Bytes::copy_from_slice(body.as_bytes()),
            url: Url::parse("http://127.0.0.1/").unwrap(),
            redirect_urls: Vec::new(),
        };
        Self::from_raw(Uuid::nil(), method, raw, false).unwrap()
    }
}
