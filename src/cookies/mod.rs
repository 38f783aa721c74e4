//! Cookie state carried across hops and across an agent's requests.
//!
//! # Data Flow
//! ```text
//! caller `cookie` header ──▶ set_cookies_from_header_value ──┐
//! Set-Cookie (redirect hop) ─▶ set_cookie_from_set_cookie_header ─▶ jar
//! Set-Cookie (final response) ┘                                    │
//!                                                                  ▼
//!                                  next request: cookie_header_value(domain, path)
//! ```
//!
//! # Design Decisions
//! - The core only talks to the `CookieStore` trait; `CookieJar` is the bundled store
//! - Stores use interior mutability so one jar can be shared through an `Arc`

pub mod jar;
pub mod store;

pub use jar::CookieJar;
pub use store::CookieStore;
