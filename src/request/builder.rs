//! Fluent request descriptor.

use std::future::IntoFuture;

use axum::http::Method;
use futures_util::future::BoxFuture;
use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::assertions::{Expectation, HeaderMatch};
use crate::client::HttpTest;
use crate::error::{Error, Result};
use crate::request::execute;
use crate::request::options::{Payload, RequestOptions};
use crate::response::TestResponse;

/// A lazily executed request.
///
/// Configure it with chained calls, then `.await` it to run the exchange and
/// every queued expectation.
#[must_use = "a test request does nothing until it is awaited"]
#[derive(Debug)]
pub struct TestRequest {
    client: Option<HttpTest>,
    id: Uuid,
    method: Method,
    path: String,
    options: RequestOptions,
    pending: Vec<Expectation>,
    deferred: Option<Error>,
}

impl TestRequest {
    /// A request with no client behind it. Awaiting it is a misuse error.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            client: None,
            id: Uuid::new_v4(),
            method,
            path: path.into(),
            options: RequestOptions::default(),
            pending: Vec::new(),
            deferred: None,
        }
    }

    pub(crate) fn bound(client: HttpTest, method: Method, path: impl Into<String>) -> Self {
        Self {
            client: Some(client),
            ..Self::new(method, path)
        }
    }

    /// Set a header; names are case-insensitive.
    pub fn set(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.options.set_header(name.as_ref(), value);
        self
    }

    /// Set several headers at once.
    pub fn set_all<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self = self.set(name, value);
        }
        self
    }

    /// Attach a body. Text is sent verbatim, JSON values are serialized.
    pub fn send(mut self, body: impl Into<Payload>) -> Self {
        self.options.apply_payload(body.into());
        self
    }

    /// Serialize any value as a JSON body.
    pub fn send_json<T: Serialize + ?Sized>(self, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.send(value),
            Err(e) => self.defer(Error::Parse(e)),
        }
    }

    /// Parse the response body as JSON.
    pub fn json(self) -> Self {
        self.json_if(true)
    }

    /// Toggle JSON parsing of the response body.
    pub fn json_if(mut self, want: bool) -> Self {
        self.options.set_wants_json(want);
        self
    }

    /// Replace the query string parameters.
    pub fn query<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.options
            .set_query(params.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Follow up to `max` redirects. Zero returns the raw 3xx.
    pub fn redirects(mut self, max: u32) -> Self {
        self.options.set_redirects(max);
        self
    }

    /// Queue an expectation: a status code, or a `(header, value)` pair.
    pub fn expect(mut self, expectation: impl Into<Expectation>) -> Self {
        self.pending.push(expectation.into());
        self
    }

    pub fn expect_status(self, status: u16) -> Self {
        self.expect(Expectation::Status(status))
    }

    pub fn expect_header(self, name: impl Into<String>, expected: impl Into<HeaderMatch>) -> Self {
        self.expect(Expectation::header(name, expected))
    }

    /// The client that will execute this request, if any.
    pub fn client(&self) -> Option<&HttpTest> {
        self.client.as_ref()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Number of expectations still queued.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Run the exchange, draining the queued expectations.
    ///
    /// Running again re-issues the exchange with whatever has been queued since.
    /// A failure recorded while building is reported by every run.
    pub async fn execute(&mut self) -> Result<TestResponse> {
        let pending = std::mem::take(&mut self.pending);
        if let Some(e) = &self.deferred {
            return Err(e.duplicate());
        }
        let Some(client) = self.client.clone() else {
            return Err(Error::Misuse(format!(
                "{} {} has no client to execute it",
                self.method, self.path
            )));
        };
        execute::run(client.shared(), self.id, &self.method, &self.path, &self.options, pending).await
    }

    /// Run the request on the tokio runtime without awaiting it here.
    pub fn spawn(self) -> JoinHandle<Result<TestResponse>> {
        tokio::spawn(self.into_future())
    }

    fn defer(mut self, error: Error) -> Self {
        self.deferred.get_or_insert(error);
        self
    }
}

impl IntoFuture for TestRequest {
    type Output = Result<TestResponse>;
    type IntoFuture = BoxFuture<'static, Result<TestResponse>>;

    fn into_future(mut self) -> Self::IntoFuture {
        Box::pin(async move { self.execute().await })
    }
}
