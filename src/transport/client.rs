//! Default transport over hyper-util's legacy client.
//!
//! # Responsibilities
//! - Issue one HTTP/1.1 round trip per hop and buffer the body
//! - Follow redirects manually so every hop passes through the hooks
//! - Map wire failures to stable error codes
//!
//! # Design Decisions
//! - Idle pooling is disabled: ephemeral servers must be able to drain and stop
//!   as soon as the exchange settles
//! - Cookie and authorization headers are dropped on cross-origin hops

use std::error::Error as StdError;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri};
use futures_util::future::BoxFuture;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use crate::config::TransportConfig;
use crate::error::{Error, Result};
use crate::transport::redirect::{next_hop, same_origin};
use crate::transport::{Exchange, ExchangeHooks, RawResponse, Transport};

/// HTTP/1.1 transport built on hyper.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Body>,
    timeout: Option<Duration>,
    user_agent: Option<HeaderValue>,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransport {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(HttpConnector::new());

        Self {
            client,
            timeout: None,
            user_agent: None,
        }
    }

    /// Build a transport from configuration. An unusable user agent is ignored.
    pub fn from_config(config: &TransportConfig) -> Self {
        let mut transport = Self::new();
        if config.request_timeout_secs > 0 {
            transport.timeout = Some(Duration::from_secs(config.request_timeout_secs));
        }
        transport.user_agent = config.user_agent.as_deref().and_then(|ua| {
            HeaderValue::from_str(ua)
                .inspect_err(|e| tracing::warn!(user_agent = %ua, error = %e, "Ignoring invalid user agent"))
                .ok()
        });
        transport
    }

    /// Bound the whole exchange, including redirect hops.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn round_trip(
        &self,
        method: &Method,
        url: &Url,
        headers: &HeaderMap,
        body: &Bytes,
    ) -> Result<(StatusCode, HeaderMap, Bytes)> {
        let uri: Uri = url
            .as_str()
            .parse()
            .map_err(|e| Error::invalid_url(url.as_str(), e))?;

        let body = if body.is_empty() {
            Body::empty()
        } else {
            Body::from(body.clone())
        };
        let mut req = Request::builder()
            .method(method.clone())
            .uri(uri)
            .body(body)
            .map_err(|e| Error::invalid_url(url.as_str(), e))?;
        *req.headers_mut() = headers.clone();
        if let Some(ua) = &self.user_agent {
            req.headers_mut().entry(header::USER_AGENT).or_insert(ua.clone());
        }

        let response = self.client.request(req).await.map_err(|e| {
            let code = if e.is_connect() {
                classify(&e).unwrap_or("ECONNREFUSED")
            } else {
                classify(&e).unwrap_or("ETRANSPORT")
            };
            transport_error(code, url, &e)
        })?;

        let (parts, incoming) = response.into_parts();
        let bytes = axum::body::to_bytes(Body::new(incoming), usize::MAX)
            .await
            .map_err(|e| transport_error(classify(&e).unwrap_or("ECONNRESET"), url, &e))?;

        Ok((parts.status, parts.headers, bytes))
    }

    async fn follow(&self, exchange: Exchange, hooks: &mut dyn ExchangeHooks) -> Result<RawResponse> {
        let Exchange {
            mut method,
            mut url,
            mut headers,
            mut body,
            redirect,
        } = exchange;
        let mut redirect_urls = Vec::new();

        loop {
            let (status, response_headers, bytes) =
                self.round_trip(&method, &url, &headers, &body).await?;

            tracing::debug!(method = %method, url = %url, status = %status, "Hop completed");

            let hop = if redirect.follow {
                next_hop(status, &method, &response_headers, &url)?
            } else {
                None
            };

            let Some(hop) = hop else {
                hooks.after_response(&url, &response_headers);
                return Ok(RawResponse {
                    status,
                    headers: response_headers,
                    body: bytes,
                    url,
                    redirect_urls,
                });
            };

            if redirect_urls.len() as u32 >= redirect.max {
                tracing::debug!(max = redirect.max, url = %url, "Redirect cap reached");
                return Err(Error::TooManyRedirects {
                    max: redirect.max,
                    url: url.to_string(),
                });
            }

            hooks.before_redirect(&url, &response_headers);

            if !hop.keeps_body(&method) {
                body = Bytes::new();
                headers.remove(header::CONTENT_TYPE);
                headers.remove(header::CONTENT_LENGTH);
            }
            if !same_origin(&url, &hop.url) {
                headers.remove(header::COOKIE);
                headers.remove(header::AUTHORIZATION);
            }

            tracing::debug!(from = %url, to = %hop.url, method = %hop.method, "Following redirect");
            method = hop.method;
            url = hop.url;
            redirect_urls.push(url.clone());
        }
    }
}

impl Transport for HyperTransport {
    fn send<'a>(
        &'a self,
        exchange: Exchange,
        hooks: &'a mut dyn ExchangeHooks,
    ) -> BoxFuture<'a, Result<RawResponse>> {
        Box::pin(async move {
            match self.timeout {
                Some(limit) => {
                    let url = exchange.url.to_string();
                    tokio::time::timeout(limit, self.follow(exchange, hooks))
                        .await
                        .unwrap_or_else(|_| {
                            Err(Error::Transport {
                                code: "ETIMEDOUT",
                                message: format!("Timeout awaiting response after {:?}", limit),
                                url,
                            })
                        })
                }
                None => self.follow(exchange, hooks).await,
            }
        })
    }
}

fn transport_error(code: &'static str, url: &Url, err: &(dyn StdError + 'static)) -> Error {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    Error::Transport {
        code,
        url: url.to_string(),
        message,
    }
}

/// Walk the error chain looking for a recognizable cause.
fn classify(err: &(dyn StdError + 'static)) -> Option<&'static str> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(h) = e.downcast_ref::<hyper::Error>() {
            if h.is_incomplete_message() || h.is_closed() || h.is_canceled() {
                return Some("ECONNRESET");
            }
            if h.is_parse() || h.is_parse_status() || h.is_parse_too_large() {
                return Some("EPROTO");
            }
            if h.is_timeout() {
                return Some("ETIMEDOUT");
            }
        }
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            use std::io::ErrorKind;
            match io.kind() {
                ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::BrokenPipe
                | ErrorKind::UnexpectedEof => return Some("ECONNRESET"),
                ErrorKind::ConnectionRefused => return Some("ECONNREFUSED"),
                ErrorKind::TimedOut => return Some("ETIMEDOUT"),
                _ => {}
            }
        }
        current = e.source();
    }
    None
}
