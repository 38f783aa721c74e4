//! Redirect hop decisions.
//!
//! # Design Decisions
//! - 301/302 turn POST into GET, 303 turns anything but HEAD into GET
//! - 307/308 keep the method and the body
//! - Location is resolved against the URL of the hop that returned it

use axum::http::{header, HeaderMap, Method, StatusCode};
use url::Url;

use crate::error::{Error, Result};

/// The request to issue for the next hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectHop {
    pub url: Url,
    pub method: Method,
}

impl RedirectHop {
    /// Whether the body (and its framing headers) survive the hop.
    pub fn keeps_body(&self, previous: &Method) -> bool {
        self.method == *previous
    }
}

pub fn is_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

/// Decide the next hop for a response, or `None` when it is final.
pub fn next_hop(
    status: StatusCode,
    method: &Method,
    headers: &HeaderMap,
    current: &Url,
) -> Result<Option<RedirectHop>> {
    if !is_redirect(status) {
        return Ok(None);
    }
    let Some(location) = headers.get(header::LOCATION) else {
        return Ok(None);
    };
    let location = location
        .to_str()
        .map_err(|e| Error::invalid_header("location", e))?;
    let url = current
        .join(location)
        .map_err(|e| Error::invalid_url(location, e))?;

    let method = match status.as_u16() {
        303 if *method != Method::HEAD => Method::GET,
        301 | 302 if *method == Method::POST => Method::GET,
        _ => method.clone(),
    };

    Ok(Some(RedirectHop { url, method }))
}

/// Whether two URLs share scheme, host and port.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}
