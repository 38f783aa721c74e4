//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::Path,
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// The application under test.
pub fn app() -> Router {
    Router::new()
        .route("/", get(root).head(root_head).post(echo).delete(no_content))
        .route("/api", post(api_create).put(api_update))
        .route("/content", put(content))
        .route("/see-other", post(see_other))
        .route("/redirectverb", post(redirect_verb))
        .route("/redirectchain", get(redirect_chain))
        .route("/api/parse/{status}", get(api_parse))
        .fallback(not_found)
}

fn tag(res: &mut Response, uri: &Uri, headers: &HeaderMap) {
    let in_url = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    if let Ok(v) = HeaderValue::from_str(in_url) {
        res.headers_mut().insert("in-url", v);
    }
    if let Some(cookie) = headers.get(header::COOKIE) {
        res.headers_mut().insert("in-cookie", cookie.clone());
    }
}

async fn root(uri: Uri, headers: HeaderMap) -> Response {
    let mut res = Html("<html/>").into_response();
    tag(&mut res, &uri, &headers);
    res
}

async fn root_head(uri: Uri, headers: HeaderMap) -> Response {
    let mut res = Response::new(Body::empty());
    res.headers_mut()
        .insert(header::CONTENT_LENGTH, HeaderValue::from_static("7"));
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    tag(&mut res, &uri, &headers);
    res
}

async fn echo(uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let mut res = Response::new(Body::from(body));
    tag(&mut res, &uri, &headers);
    res.headers_mut()
        .append(header::SET_COOKIE, HeaderValue::from_static("a=b"));
    if let Some(ct) = headers.get(header::CONTENT_TYPE) {
        res.headers_mut().insert(header::CONTENT_TYPE, ct.clone());
    }
    res
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn api_create(Json(body): Json<Value>) -> impl IntoResponse {
    (StatusCode::CREATED, Json(body))
}

async fn api_update(Json(body): Json<Value>) -> impl IntoResponse {
    (StatusCode::OK, Json(body))
}

async fn content(body: String) -> String {
    body
}

async fn see_other() -> impl IntoResponse {
    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/"),
            (header::SET_COOKIE, "redirect=root; path=/"),
        ],
    )
}

async fn redirect_verb() -> impl IntoResponse {
    (
        StatusCode::TEMPORARY_REDIRECT,
        [
            (header::LOCATION, "/"),
            (header::SET_COOKIE, "redirect=root; path=/"),
        ],
    )
}

async fn redirect_chain() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/redirectchain")])
}

async fn api_parse(Path(status): Path<u16>) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(serde_json::json!({}))).into_response()
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (StatusCode::NOT_FOUND, format!("Not found {}", uri.path()))
}

/// Serve the app on an OS-assigned port for the rest of the test.
pub async fn start_app() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app()).await;
    });
    addr
}

/// Start a backend that reads the request and then drops the connection.
pub async fn start_reset_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 1024];
                        let _ = socket.read(&mut buf).await;
                        drop(socket);
                    });
                }
                Err(_) => break,
            }
        }
    });
    addr
}

/// Start a backend that accepts connections and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        drop(socket);
                    });
                }
                Err(_) => break,
            }
        }
    });
    addr
}

/// Start a simple mock backend that returns a fixed raw HTTP response.
pub async fn start_raw_backend(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 1024];
                        let _ = socket.read(&mut buf).await;
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
    addr
}

/// Whether anything still accepts connections at `url`'s host and port.
pub async fn is_listening(url: &url::Url) -> bool {
    let host = url.host_str().unwrap_or("127.0.0.1");
    let port = url.port_or_known_default().unwrap_or(80);
    tokio::net::TcpStream::connect((host, port)).await.is_ok()
}
