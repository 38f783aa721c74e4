//! What a request targets, and where the ambient port comes from.

use std::sync::atomic::{AtomicU16, Ordering};

use axum::Router;

/// The value describing what requests are sent to.
#[derive(Debug, Clone, Default)]
pub enum Initiator {
    /// An in-process application, served on a throwaway port per request.
    Handler(Router),
    /// A server already listening on the configured loopback host.
    Port(u16),
    /// A base URL such as `http://localhost:8080`.
    Origin(String),
    /// Whatever port the ambient [`PortSource`] reports at execution time.
    #[default]
    Ambient,
}

impl From<Router> for Initiator {
    fn from(router: Router) -> Self {
        Initiator::Handler(router)
    }
}

impl From<u16> for Initiator {
    fn from(port: u16) -> Self {
        Initiator::Port(port)
    }
}

impl From<&str> for Initiator {
    fn from(origin: &str) -> Self {
        Initiator::Origin(origin.to_string())
    }
}

impl From<String> for Initiator {
    fn from(origin: String) -> Self {
        Initiator::Origin(origin)
    }
}

impl From<url::Url> for Initiator {
    fn from(origin: url::Url) -> Self {
        Initiator::Origin(origin.into())
    }
}

/// Supplies the port used when no initiator is given.
pub trait PortSource: Send + Sync + std::fmt::Debug {
    /// The raw port value, if one is currently configured.
    fn port(&self) -> Option<String>;
}

/// Reads the port from a process environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvPort {
    var: String,
}

impl EnvPort {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvPort {
    fn default() -> Self {
        Self::new("PORT")
    }
}

impl PortSource for EnvPort {
    fn port(&self) -> Option<String> {
        std::env::var(&self.var).ok()
    }
}

/// An in-memory port that tests can change between requests.
#[derive(Debug, Default)]
pub struct FixedPort {
    port: AtomicU16,
}

impl FixedPort {
    pub fn new(port: u16) -> Self {
        Self {
            port: AtomicU16::new(port),
        }
    }

    pub fn set(&self, port: u16) {
        self.port.store(port, Ordering::SeqCst);
    }
}

impl PortSource for FixedPort {
    fn port(&self) -> Option<String> {
        match self.port.load(Ordering::SeqCst) {
            0 => None,
            p => Some(p.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert!(matches!(Initiator::from(3000u16), Initiator::Port(3000)));
        assert!(matches!(Initiator::from("http://x.test"), Initiator::Origin(ref o) if o == "http://x.test"));
        assert!(matches!(Initiator::from(Router::new()), Initiator::Handler(_)));
        assert!(matches!(Initiator::default(), Initiator::Ambient));
    }

    #[test]
    fn test_fixed_port_is_read_live() {
        let source = FixedPort::default();
        assert_eq!(source.port(), None);
        source.set(4321);
        assert_eq!(source.port().as_deref(), Some("4321"));
    }

    #[test]
    fn test_env_port_unset_variable() {
        let source = EnvPort::new("HTTPTEST_SURELY_UNSET_PORT_VARIABLE");
        assert_eq!(source.port(), None);
    }
}
