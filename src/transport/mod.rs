//! Transport subsystem: performs the HTTP exchange for a test request.
//!
//! # Data Flow
//! ```text
//! Exchange (method, url+query, headers, body bytes, redirect policy)
//!     → client.rs (one round trip per hop over hyper-util's client)
//!     → redirect.rs (decide next hop: target + method rewrite)
//!         → hooks.before_redirect(hop headers)    [per followed hop]
//!     → hooks.after_response(final headers)
//!     → RawResponse
//! ```
//!
//! # Design Decisions
//! - Non-2xx statuses are ordinary responses, never errors
//! - Redirects are followed only when the policy says so, never by default
//! - Hooks get read-only views; they cannot steer the redirect chain
//! - Timeouts belong to the transport, not to the request builder

pub mod client;
pub mod redirect;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use futures_util::future::BoxFuture;
use url::Url;

use crate::error::Result;

pub use client::HyperTransport;

/// Whether and how far to follow redirects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RedirectPolicy {
    pub follow: bool,
    pub max: u32,
}

impl RedirectPolicy {
    /// Follow up to `max` hops; zero disables following entirely.
    pub fn limited(max: u32) -> Self {
        Self {
            follow: max > 0,
            max,
        }
    }
}

/// A fully resolved request ready to go on the wire.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub redirect: RedirectPolicy,
}

/// What came back from the final hop.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// URL of the final hop.
    pub url: Url,
    /// Every URL redirected to, in order.
    pub redirect_urls: Vec<Url>,
}

/// Interception points fired while an exchange runs.
pub trait ExchangeHooks: Send {
    /// The final response's headers arrived.
    fn after_response(&mut self, url: &Url, headers: &HeaderMap);

    /// A redirect response from `url` is about to be followed.
    fn before_redirect(&mut self, url: &Url, headers: &HeaderMap);
}

/// Hooks that observe nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl ExchangeHooks for NoHooks {
    fn after_response(&mut self, _url: &Url, _headers: &HeaderMap) {}
    fn before_redirect(&mut self, _url: &Url, _headers: &HeaderMap) {}
}

/// Performs one exchange, including any redirect hops the policy allows.
pub trait Transport: Send + Sync + std::fmt::Debug {
    fn send<'a>(
        &'a self,
        exchange: Exchange,
        hooks: &'a mut dyn ExchangeHooks,
    ) -> BoxFuture<'a, Result<RawResponse>>;
}
