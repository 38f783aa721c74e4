//! Transport failures, misuse, and the hook contract seen by a custom transport.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use futures_util::future::BoxFuture;
use httptest::config::ClientConfig;
use httptest::transport::{Exchange, ExchangeHooks, RawResponse};
use httptest::{HttpTest, TestRequest, Transport};
use url::Url;

mod common;

#[tokio::test]
async fn test_connection_reset() {
    let addr = common::start_reset_backend().await;

    let err = HttpTest::new(addr.port()).get("/").await.unwrap_err();
    assert_eq!(err.code(), "ECONNRESET");
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = HttpTest::new(port).get("/").await.unwrap_err();
    assert_eq!(err.code(), "ECONNREFUSED");
}

#[tokio::test]
async fn test_configured_timeout() {
    let addr = common::start_silent_backend().await;
    let mut config = ClientConfig::default();
    config.transport.request_timeout_secs = 1;

    let err = HttpTest::with_config(addr.port(), config)
        .get("/")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ETIMEDOUT");
}

#[tokio::test]
async fn test_unfollowed_redirect_still_closes_server() {
    let res = HttpTest::new(common::app()).get("/redirectchain").await.unwrap();
    assert!(!common::is_listening(res.url()).await);
}

#[tokio::test]
async fn test_raw_backend_response_passes_through() {
    let addr = common::start_raw_backend(
        "HTTP/1.1 418 I'm a teapot\r\ncontent-length: 3\r\nx-kind: tea\r\n\r\nhot",
    )
    .await;

    let res = HttpTest::new(addr.port())
        .get("/")
        .expect(418)
        .expect(("x-kind", "tea"))
        .await
        .unwrap();
    assert_eq!(res.text().as_deref(), Some("hot"));
}

#[tokio::test]
async fn test_malformed_response_is_protocol_error() {
    let addr = common::start_raw_backend("GARBAGE\r\n\r\n").await;

    let err = HttpTest::new(addr.port()).get("/").await.unwrap_err();
    assert_eq!(err.code(), "EPROTO");
}

#[tokio::test]
async fn test_detached_request_rejects() {
    let err = TestRequest::new(Method::GET, "/").await.unwrap_err();
    assert_eq!(err.code(), "ERR_MISUSE");
}

#[derive(Debug, Default)]
struct Recording {
    seen: Mutex<Vec<(Method, Option<String>)>>,
}

impl Transport for Recording {
    fn send<'a>(
        &'a self,
        exchange: Exchange,
        hooks: &'a mut dyn ExchangeHooks,
    ) -> BoxFuture<'a, httptest::Result<RawResponse>> {
        Box::pin(async move {
            let cookie = exchange
                .headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            self.seen
                .lock()
                .unwrap()
                .push((exchange.method.clone(), cookie));

            let hop = exchange.url.join("/landing").unwrap();
            let mut redirect = HeaderMap::new();
            redirect.insert(header::SET_COOKIE, HeaderValue::from_static("hop=1; path=/"));
            hooks.before_redirect(&exchange.url, &redirect);

            let mut last = HeaderMap::new();
            last.insert(header::SET_COOKIE, HeaderValue::from_static("final=2"));
            hooks.after_response(&hop, &last);

            Ok(RawResponse {
                status: StatusCode::OK,
                headers: HeaderMap::new(),
                body: Bytes::from_static(b"ok"),
                url: hop.clone(),
                redirect_urls: vec![hop],
            })
        })
    }
}

#[tokio::test]
async fn test_custom_transport_sees_merged_cookie_and_feeds_hooks() {
    let transport = Arc::new(Recording::default());
    let agent = HttpTest::agent("http://127.0.0.1:9")
        .with_transport(transport.clone());

    agent.get("/").set("cookie", "my=bar").await.unwrap();
    let res = agent.get("/").await.unwrap();

    assert_eq!(res.url(), &Url::parse("http://127.0.0.1:9/landing").unwrap());
    let seen = transport.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].1.as_deref(), Some("my=bar"));
    assert_eq!(seen[1].1.as_deref(), Some("my=bar; hop=1; final=2"));
}

#[tokio::test]
async fn test_spawned_timeout_reports_error() {
    let addr = common::start_silent_backend().await;
    let mut config = ClientConfig::default();
    config.transport.request_timeout_secs = 1;

    let handle = HttpTest::with_config(addr.port(), config).get("/").spawn();
    let outcome = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome.unwrap_err().code(), "ETIMEDOUT");
}
