//! Mutable configuration owned by a single request.

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::transport::RedirectPolicy;

const TEXT_CONTENT_TYPE: &str = "text/plain";
const JSON_CONTENT_TYPE: &str = "application/json";

/// What `send` was given.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Nothing; leaves the request untouched.
    Absent,
    /// Sent verbatim, defaulting the content type to `text/plain`.
    Text(String),
    /// Serialized as JSON.
    Structured(Value),
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<Value> for Payload {
    fn from(v: Value) -> Self {
        Payload::Structured(v)
    }
}

impl From<()> for Payload {
    fn from(_: ()) -> Self {
        Payload::Absent
    }
}

impl<T: Into<Payload>> From<Option<T>> for Payload {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Payload::Absent)
    }
}

/// The body as it will be sent.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Raw(String),
    Json(Value),
}

/// Headers, query, body and redirect settings for one request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    headers: BTreeMap<String, String>,
    content_type: Option<String>,
    query: Option<Vec<(String, String)>>,
    redirects: Option<RedirectPolicy>,
    body: Option<RequestBody>,
    wants_json: bool,
}

impl RequestOptions {
    /// Store a header under its lower-cased name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Content type implied by the last `send`, before explicit headers apply.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    pub fn query(&self) -> Option<&[(String, String)]> {
        self.query.as_deref()
    }

    pub fn set_query(&mut self, params: Vec<(String, String)>) {
        self.query = Some(params);
    }

    pub fn redirect_policy(&self) -> RedirectPolicy {
        self.redirects.unwrap_or_default()
    }

    pub fn set_redirects(&mut self, max: u32) {
        self.redirects = Some(RedirectPolicy::limited(max));
    }

    pub fn wants_json(&self) -> bool {
        self.wants_json
    }

    pub fn set_wants_json(&mut self, want: bool) {
        self.wants_json = want;
    }

    /// Apply a body according to its shape.
    pub fn apply_payload(&mut self, payload: Payload) {
        match payload {
            Payload::Absent => {}
            Payload::Text(text) => {
                self.content_type = Some(TEXT_CONTENT_TYPE.to_string());
                self.body = Some(RequestBody::Raw(text));
            }
            Payload::Structured(Value::Null) => {
                self.content_type = None;
                self.headers.remove("content-type");
                if matches!(self.body, Some(RequestBody::Raw(_))) {
                    self.body = None;
                }
            }
            Payload::Structured(value) => {
                self.content_type = None;
                self.headers.remove("content-type");
                self.body = Some(RequestBody::Json(value));
            }
        }
    }

    /// Validated outgoing headers and the serialized body.
    ///
    /// Explicit headers override the content type implied by the body.
    pub fn prepare(&self) -> Result<(HeaderMap, Bytes)> {
        let mut headers = HeaderMap::new();

        if let Some(ct) = &self.content_type {
            let value = HeaderValue::from_str(ct).map_err(|e| Error::invalid_header("content-type", e))?;
            headers.insert(header::CONTENT_TYPE, value);
        }

        for (name, value) in &self.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::invalid_header(name.as_str(), e))?;
            let header_value = HeaderValue::from_str(value).map_err(|e| Error::invalid_header(name.as_str(), e))?;
            headers.insert(header_name, header_value);
        }

        if self.wants_json {
            headers
                .entry(header::ACCEPT)
                .or_insert(HeaderValue::from_static(JSON_CONTENT_TYPE));
        }

        let body = match &self.body {
            None => Bytes::new(),
            Some(RequestBody::Raw(text)) => Bytes::from(text.clone()),
            Some(RequestBody::Json(value)) => {
                headers
                    .entry(header::CONTENT_TYPE)
                    .or_insert(HeaderValue::from_static(JSON_CONTENT_TYPE));
                Bytes::from(serde_json::to_vec(value)?)
            }
        };

        Ok((headers, body))
    }
}
