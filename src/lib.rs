//! HTTP integration-testing client.
//!
//! Point an [`HttpTest`] at an in-process [`axum::Router`], a port, or a base
//! URL; build requests fluently; await them to run the exchange and every
//! queued expectation. Agents carry cookies across requests and redirect hops.

pub mod assertions;
pub mod client;
pub mod config;
pub mod cookies;
pub mod error;
pub mod observability;
pub mod request;
pub mod response;
pub mod target;
pub mod transport;

pub use assertions::{AssertionError, Expectation, HeaderMatch};
pub use client::HttpTest;
pub use config::ClientConfig;
pub use cookies::{CookieJar, CookieStore};
pub use error::{Error, Result};
pub use request::{Payload, TestRequest};
pub use response::{ResponseBody, TestResponse};
pub use target::{EnvPort, FixedPort, Initiator, PortSource};
pub use transport::{HyperTransport, RedirectPolicy, Transport};
