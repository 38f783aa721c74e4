//! In-memory, insertion-ordered cookie jar.
//!
//! # Responsibilities
//! - Parse `Set-Cookie` values (via the `cookie` crate)
//! - Scope cookies by domain and path (RFC 6265 §5.1.3, §5.1.4)
//! - Drop cookies once `Max-Age`/`Expires` says they are gone
//!
//! # Design Decisions
//! - A cookie with the same name, domain and path replaces the old one in place,
//!   so serialization order is order of first occurrence
//! - `Secure`/`HttpOnly` are recorded by servers but not enforced here

use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use cookie::time::OffsetDateTime;
use cookie::Cookie;
use url::Url;

use crate::cookies::store::CookieStore;

#[derive(Debug, Clone)]
struct StoredCookie {
    name: String,
    value: String,
    domain: String,
    host_only: bool,
    path: String,
    expires: Option<OffsetDateTime>,
}

impl StoredCookie {
    fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires.is_some_and(|at| at <= now)
    }

    fn same_slot(&self, other: &StoredCookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }

    fn applies_to(&self, domain: &str, path: &str) -> bool {
        let domain_ok = if self.host_only {
            self.domain == domain
        } else {
            domain_matches(domain, &self.domain)
        };
        domain_ok && path_matches(path, &self.path)
    }
}

/// Thread-safe cookie jar shared by every request an agent creates.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: Mutex<Vec<StoredCookie>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name/value pairs of all live cookies, in storage order.
    pub fn snapshot(&self) -> Vec<(String, String)> {
        let now = OffsetDateTime::now_utc();
        self.lock()
            .iter()
            .filter(|c| !c.is_expired(now))
            .map(|c| (c.name.clone(), c.value.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StoredCookie>> {
        self.cookies.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn store(&self, cookie: StoredCookie) {
        let now = OffsetDateTime::now_utc();
        let mut cookies = self.lock();
        cookies.retain(|c| !c.is_expired(now));

        let position = cookies.iter().position(|c| c.same_slot(&cookie));
        if cookie.is_expired(now) {
            if let Some(idx) = position {
                cookies.remove(idx);
            }
            return;
        }

        match position {
            Some(idx) => cookies[idx] = cookie,
            None => cookies.push(cookie),
        }
    }
}

impl CookieStore for CookieJar {
    fn set_cookies_from_header_value(&self, value: &str, domain: &str, path: &str) {
        for pair in value.split(';') {
            let Some((name, value)) = pair.trim().split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            self.store(StoredCookie {
                name: name.to_string(),
                value: value.trim().to_string(),
                domain: domain.to_ascii_lowercase(),
                host_only: true,
                path: path.to_string(),
                expires: None,
            });
        }
    }

    fn set_cookie_from_set_cookie_header(&self, value: &str, url: &Url) {
        let parsed = match Cookie::parse(value) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring malformed set-cookie header");
                return;
            }
        };
        let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
            return;
        };

        let (domain, host_only) = match parsed.domain() {
            Some(d) if !d.is_empty() => {
                let d = d.trim_start_matches('.').to_ascii_lowercase();
                if !domain_matches(&host, &d) {
                    tracing::debug!(cookie = parsed.name(), domain = %d, host = %host, "Rejecting cookie for foreign domain");
                    return;
                }
                (d, false)
            }
            _ => (host, true),
        };

        let path = match parsed.path() {
            Some(p) if p.starts_with('/') => p.to_string(),
            _ => default_path(url.path()),
        };

        let now = OffsetDateTime::now_utc();
        let expires = match parsed.max_age() {
            Some(age) if age.is_zero() || age.is_negative() => Some(now),
            // Too far out to represent: keep it for the life of the jar.
            Some(age) => now.checked_add(age),
            None => parsed.expires_datetime(),
        };

        self.store(StoredCookie {
            name: parsed.name().to_string(),
            value: parsed.value().to_string(),
            domain,
            host_only,
            path,
            expires,
        });
    }

    fn cookie_header_value(&self, domain: &str, path: &str) -> String {
        let now = OffsetDateTime::now_utc();
        let domain = domain.to_ascii_lowercase();
        self.lock()
            .iter()
            .filter(|c| !c.is_expired(now) && c.applies_to(&domain, path))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn domain_matches(host: &str, domain: &str) -> bool {
    if host == domain {
        return true;
    }
    if host.parse::<IpAddr>().is_ok() {
        return false;
    }
    host.len() > domain.len()
        && host.ends_with(domain)
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
}

fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    let request_path = if request_path.is_empty() { "/" } else { request_path };
    if request_path == cookie_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/'))
}

fn default_path(request_path: &str) -> String {
    if !request_path.starts_with('/') {
        return "/".to_string();
    }
    match request_path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => request_path[..idx].to_string(),
    }
}
