//! Request factory and cookie-carrying agent.
//!
//! # Responsibilities
//! - Bind an initiator, a transport, an ambient port source and configuration
//! - Hand out fresh `TestRequest`s pre-populated with method and path
//! - For agents, share one cookie jar across every request created

use std::sync::Arc;

use axum::http::Method;

use crate::config::ClientConfig;
use crate::cookies::{CookieJar, CookieStore};
use crate::request::{Payload, TestRequest};
use crate::target::{EnvPort, Initiator, PortSource};
use crate::transport::{HyperTransport, Transport};

#[derive(Debug, Clone)]
pub(crate) struct Shared {
    pub(crate) initiator: Initiator,
    pub(crate) jar: Option<Arc<dyn CookieStore>>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) ports: Arc<dyn PortSource>,
    pub(crate) config: ClientConfig,
}

/// Entry point for issuing test requests against one target.
///
/// ```no_run
/// # async fn demo(app: axum::Router) -> httptest::Result<()> {
/// use httptest::HttpTest;
///
/// let res = HttpTest::new(app)
///     .get("/")
///     .expect(200)
///     .expect(("content-type", "text/html; charset=utf-8"))
///     .await?;
/// assert_eq!(res.text().as_deref(), Some("<html/>"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpTest {
    shared: Arc<Shared>,
}

impl HttpTest {
    /// A client with default configuration and no cookie jar.
    pub fn new(initiator: impl Into<Initiator>) -> Self {
        Self::with_config(initiator, ClientConfig::default())
    }

    pub fn with_config(initiator: impl Into<Initiator>, config: ClientConfig) -> Self {
        let transport = Arc::new(HyperTransport::from_config(&config.transport));
        let ports = Arc::new(EnvPort::new(config.target.port_env.clone()));
        Self {
            shared: Arc::new(Shared {
                initiator: initiator.into(),
                jar: None,
                transport,
                ports,
                config,
            }),
        }
    }

    /// A client whose requests all share one fresh cookie jar.
    pub fn agent(initiator: impl Into<Initiator>) -> Self {
        Self::new(initiator).with_jar(Arc::new(CookieJar::new()))
    }

    /// Share `jar` between every request this client creates.
    pub fn with_jar(self, jar: Arc<dyn CookieStore>) -> Self {
        self.update(|shared| shared.jar = Some(jar))
    }

    pub fn with_transport(self, transport: Arc<dyn Transport>) -> Self {
        self.update(|shared| shared.transport = transport)
    }

    /// Override where the ambient port is read from.
    pub fn with_port_source(self, ports: Arc<dyn PortSource>) -> Self {
        self.update(|shared| shared.ports = ports)
    }

    /// The shared cookie jar, for agents.
    pub fn jar(&self) -> Option<&Arc<dyn CookieStore>> {
        self.shared.jar.as_ref()
    }

    pub fn initiator(&self) -> &Initiator {
        &self.shared.initiator
    }

    pub fn config(&self) -> &ClientConfig {
        &self.shared.config
    }

    pub fn get(&self, path: impl Into<String>) -> TestRequest {
        self.request(Method::GET, path)
    }

    pub fn head(&self, path: impl Into<String>) -> TestRequest {
        self.request(Method::HEAD, path)
    }

    pub fn post(&self, path: impl Into<String>) -> TestRequest {
        self.request(Method::POST, path)
    }

    pub fn post_with(&self, path: impl Into<String>, body: impl Into<Payload>) -> TestRequest {
        self.post(path).send(body)
    }

    pub fn put(&self, path: impl Into<String>) -> TestRequest {
        self.request(Method::PUT, path)
    }

    pub fn put_with(&self, path: impl Into<String>, body: impl Into<Payload>) -> TestRequest {
        self.put(path).send(body)
    }

    pub fn delete(&self, path: impl Into<String>) -> TestRequest {
        self.request(Method::DELETE, path)
    }

    /// Alias for [`HttpTest::delete`].
    pub fn del(&self, path: impl Into<String>) -> TestRequest {
        self.delete(path)
    }

    pub fn request(&self, method: Method, path: impl Into<String>) -> TestRequest {
        TestRequest::bound(self.clone(), method, path)
    }

    pub(crate) fn shared(&self) -> &Shared {
        &self.shared
    }

    fn update(mut self, f: impl FnOnce(&mut Shared)) -> Self {
        f(Arc::make_mut(&mut self.shared));
        self
    }
}
