//! Cookie persistence across an agent's successive requests.

use std::sync::Arc;

use httptest::{CookieJar, CookieStore, HttpTest};

mod common;

#[tokio::test]
async fn test_agent_sends_captured_cookie() {
    let agent = HttpTest::agent(common::app());

    agent.post("/").expect(200).await.unwrap();
    let res = agent.get("/").expect(200).await.unwrap();

    assert_eq!(res.header("in-cookie").as_deref(), Some("a=b"));
}

#[tokio::test]
async fn test_agent_keeps_caller_cookie_first() {
    let agent = HttpTest::agent(common::app());

    let res = agent
        .post("/")
        .set("cookie", "my=bar")
        .expect(200)
        .await
        .unwrap();
    assert_eq!(res.header("in-cookie").as_deref(), Some("my=bar"));

    let res = agent.get("/").expect(200).await.unwrap();
    assert_eq!(res.header("in-cookie").as_deref(), Some("my=bar; a=b"));
}

#[tokio::test]
async fn test_plain_client_does_not_persist_cookies() {
    let client = HttpTest::new(common::app());

    client.post("/").expect(200).await.unwrap();
    let res = client.get("/").expect(200).await.unwrap();

    assert!(res.header("in-cookie").is_none());
}

#[tokio::test]
async fn test_agent_with_shared_jar() {
    let addr = common::start_app().await;
    let jar = Arc::new(CookieJar::new());
    let first = HttpTest::new(addr.port()).with_jar(jar.clone());
    let second = HttpTest::new(addr.port()).with_jar(jar.clone());

    first.post("/").await.unwrap();
    let res = second.get("/").await.unwrap();

    assert_eq!(res.header("in-cookie").as_deref(), Some("a=b"));
    assert_eq!(jar.len(), 1);
    assert_eq!(jar.cookie_header_value("127.0.0.1", "/"), "a=b");
}
