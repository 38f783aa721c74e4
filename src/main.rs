//! `httptest`: issue one request against a running server and check it.
//!
//! ```text
//! httptest --target 3000 POST /api --json-body '{"a":"b"}' --json \
//!     --expect-status 201 --expect-header content-type:application/json
//! ```

use std::path::PathBuf;

use axum::http::Method;
use clap::Parser;

use httptest::config::{load_config, ClientConfig};
use httptest::observability::logging::{init_logging, DEFAULT_FILTER};
use httptest::{HttpTest, Initiator, ResponseBody};

#[derive(Parser, Debug)]
#[command(name = "httptest")]
#[command(about = "Send one HTTP request and assert on the response", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Origin URL or port; defaults to the port in the configured environment variable
    #[arg(short, long)]
    target: Option<String>,

    /// HTTP method
    method: String,

    /// Path resolved against the target origin
    path: String,

    /// Request header as name:value (repeatable)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Text body
    #[arg(short, long)]
    data: Option<String>,

    /// JSON body
    #[arg(long, conflicts_with = "data")]
    json_body: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(short, long = "query")]
    query: Vec<String>,

    /// Follow up to N redirects
    #[arg(short, long, default_value_t = 0)]
    redirects: u32,

    /// Parse the response body as JSON
    #[arg(long)]
    json: bool,

    /// Expected status code
    #[arg(long)]
    expect_status: Option<u16>,

    /// Expected header as name:value (repeatable)
    #[arg(long = "expect-header")]
    expect_headers: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(DEFAULT_FILTER);

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };

    let initiator = cli.target.as_deref().map(parse_target).unwrap_or_default();
    let method = Method::from_bytes(cli.method.to_ascii_uppercase().as_bytes())?;

    tracing::debug!(method = %method, path = %cli.path, initiator = ?initiator, "Issuing request");

    let client = HttpTest::with_config(initiator, config);
    let mut request = client.request(method, cli.path.clone()).redirects(cli.redirects);

    for header in &cli.headers {
        let (name, value) = split_pair(header, ':')?;
        request = request.set(name, value);
    }
    if !cli.query.is_empty() {
        let params = cli
            .query
            .iter()
            .map(|q| split_pair(q, '='))
            .collect::<Result<Vec<_>, _>>()?;
        request = request.query(params);
    }
    if let Some(data) = cli.data {
        request = request.send(data);
    }
    if let Some(raw) = cli.json_body {
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        request = request.send(value);
    }
    if cli.json {
        request = request.json();
    }
    if let Some(status) = cli.expect_status {
        request = request.expect_status(status);
    }
    for header in &cli.expect_headers {
        let (name, value) = split_pair(header, ':')?;
        request = request.expect_header(name, value);
    }

    let response = request.await?;

    println!("{} {}", response.status_code(), response.url());
    for (name, value) in response.headers() {
        println!("{}: {}", name, String::from_utf8_lossy(value.as_bytes()));
    }
    match response.body() {
        ResponseBody::Json(value) => println!("\n{}", serde_json::to_string_pretty(value)?),
        ResponseBody::Text(text) => println!("\n{}", text),
        ResponseBody::Empty => {}
    }

    Ok(())
}

fn parse_target(raw: &str) -> Initiator {
    match raw.parse::<u16>() {
        Ok(port) => Initiator::Port(port),
        Err(_) => Initiator::Origin(raw.to_string()),
    }
}

fn split_pair(raw: &str, sep: char) -> Result<(String, String), String> {
    match raw.split_once(sep) {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.trim().to_string())),
        _ => Err(format!("expected name{}value, got '{}'", sep, raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert!(matches!(parse_target("8080"), Initiator::Port(8080)));
        assert!(matches!(parse_target("http://localhost:1"), Initiator::Origin(_)));
    }

    #[test]
    fn test_split_pair() {
        assert_eq!(
            split_pair("content-type: text/html", ':').unwrap(),
            ("content-type".to_string(), "text/html".to_string())
        );
        assert!(split_pair("novalue", '=').is_err());
        assert!(split_pair("=v", '=').is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "httptest",
            "--target",
            "3000",
            "post",
            "/api",
            "-H",
            "x-a:1",
            "--json-body",
            "{}",
            "--expect-status",
            "201",
        ])
        .unwrap();
        assert_eq!(cli.method, "post");
        assert_eq!(cli.headers, vec!["x-a:1"]);
        assert_eq!(cli.expect_status, Some(201));
    }
}
