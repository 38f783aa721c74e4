//! Cookie storage contract.

use url::Url;

/// Stores cookies keyed by domain and path and serializes them for a request.
///
/// Implementations must be safe to share between concurrently running
/// requests. Ordering of effects between such requests is not guaranteed.
pub trait CookieStore: Send + Sync + std::fmt::Debug {
    /// Merge a `cookie` request header value (`a=b; c=d`) scoped to `domain` and `path`.
    fn set_cookies_from_header_value(&self, value: &str, domain: &str, path: &str);

    /// Store a single `Set-Cookie` response header received from `url`.
    fn set_cookie_from_set_cookie_header(&self, value: &str, url: &Url);

    /// Serialize every cookie applicable to `domain` and `path` as a `cookie` header value.
    fn cookie_header_value(&self, domain: &str, path: &str) -> String;
}
