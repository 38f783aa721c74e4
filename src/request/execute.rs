//! Runs a configured request: resolve, exchange, close, assert.

use std::sync::Arc;

use axum::http::{header, HeaderMap, HeaderValue, Method};
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::assertions::{self, Expectation};
use crate::client::Shared;
use crate::cookies::CookieStore;
use crate::error::{Error, Result};
use crate::request::options::RequestOptions;
use crate::response::TestResponse;
use crate::target::{resolve, ResolvedTarget};
use crate::transport::{Exchange, ExchangeHooks};

/// Harvests `Set-Cookie` from every hop into the owning jar, if there is one.
#[derive(Debug)]
pub(crate) struct CookieCapture {
    jar: Option<Arc<dyn CookieStore>>,
}

impl CookieCapture {
    fn store(&self, url: &Url, headers: &HeaderMap) {
        let Some(jar) = &self.jar else {
            return;
        };
        for value in headers.get_all(header::SET_COOKIE) {
            match value.to_str() {
                Ok(v) => jar.set_cookie_from_set_cookie_header(v, url),
                Err(e) => tracing::debug!(error = %e, "Skipping non-ASCII set-cookie header"),
            }
        }
    }
}

impl ExchangeHooks for CookieCapture {
    fn after_response(&mut self, url: &Url, headers: &HeaderMap) {
        self.store(url, headers);
    }

    fn before_redirect(&mut self, url: &Url, headers: &HeaderMap) {
        self.store(url, headers);
    }
}

/// Execute one request end to end.
pub(crate) async fn run(
    shared: &Shared,
    request_id: Uuid,
    method: &Method,
    path: &str,
    options: &RequestOptions,
    pending: Vec<Expectation>,
) -> Result<TestResponse> {
    let span = tracing::debug_span!("test_request", request_id = %request_id, method = %method, path = %path);

    async move {
        let mut target = resolve(&shared.initiator, shared.ports.as_ref(), &shared.config).await?;

        let outcome = exchange(shared, &target, request_id, method, path, options).await;
        if target.close().await {
            tracing::debug!("Released ephemeral server");
        }

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(code = e.code(), error = %e, "Exchange failed");
                return Err(e);
            }
        };

        tracing::debug!(
            status = response.status_code(),
            redirects = response.redirect_urls().len(),
            "Response received"
        );

        assertions::run(pending, &response)?;
        Ok(response)
    }
    .instrument(span)
    .await
}

async fn exchange(
    shared: &Shared,
    target: &ResolvedTarget,
    request_id: Uuid,
    method: &Method,
    path: &str,
    options: &RequestOptions,
) -> Result<TestResponse> {
    let mut url = target.url_for(path)?;
    if let Some(params) = options.query() {
        url.set_query(None);
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
    }

    let (mut headers, body) = options.prepare()?;

    if let Some(jar) = &shared.jar {
        merge_cookies(jar.as_ref(), &url, &mut headers)?;
    }

    let exchange = Exchange {
        method: method.clone(),
        url,
        headers,
        body,
        redirect: options.redirect_policy(),
    };
    let mut hooks = CookieCapture {
        jar: shared.jar.clone(),
    };

    let raw = shared.transport.send(exchange, &mut hooks).await?;
    TestResponse::from_raw(request_id, method.clone(), raw, options.wants_json())
}

/// Fold a caller-supplied cookie header into the jar, then replace it with
/// everything the jar holds for this URL.
fn merge_cookies(jar: &dyn CookieStore, url: &Url, headers: &mut HeaderMap) -> Result<()> {
    let domain = url.host_str().unwrap_or_default();

    if let Some(explicit) = headers.get(header::COOKIE) {
        let explicit = explicit
            .to_str()
            .map_err(|e| Error::invalid_header("cookie", e))?;
        jar.set_cookies_from_header_value(explicit, domain, "/");
    }

    let value = jar.cookie_header_value(domain, url.path());
    if value.is_empty() {
        headers.remove(header::COOKIE);
    } else {
        let value = HeaderValue::from_str(&value).map_err(|e| Error::invalid_header("cookie", e))?;
        headers.insert(header::COOKIE, value);
    }
    Ok(())
}
