//! Turns an initiator into a concrete origin.

use std::net::{IpAddr, SocketAddr};

use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::target::initiator::{Initiator, PortSource};
use crate::target::server::EphemeralServer;

/// A resolved origin, plus the server backing it when one was started.
#[derive(Debug)]
pub struct ResolvedTarget {
    pub origin: Url,
    pub server: Option<EphemeralServer>,
}

impl ResolvedTarget {
    /// Resolve `path` against the origin with URL-join semantics.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        self.origin
            .join(path)
            .map_err(|e| Error::invalid_url(path, e))
    }

    /// Close the ephemeral server, if any. Safe to call more than once.
    pub async fn close(&mut self) -> bool {
        match self.server.as_mut() {
            Some(server) => server.close().await,
            None => false,
        }
    }
}

/// Resolve an initiator, starting a server for in-process handlers.
pub async fn resolve(
    initiator: &Initiator,
    ports: &dyn PortSource,
    config: &ClientConfig,
) -> Result<ResolvedTarget> {
    match initiator {
        Initiator::Handler(router) => {
            let server = EphemeralServer::start(router.clone(), loopback(config)?, &config.server).await?;
            let origin = loopback_origin(server.local_addr())?;
            Ok(ResolvedTarget {
                origin,
                server: Some(server),
            })
        }
        Initiator::Port(port) => Ok(ResolvedTarget {
            origin: loopback_origin(SocketAddr::new(loopback(config)?, *port))?,
            server: None,
        }),
        Initiator::Origin(origin) => Ok(ResolvedTarget {
            origin: Url::parse(origin).map_err(|e| Error::invalid_url(origin.as_str(), e))?,
            server: None,
        }),
        Initiator::Ambient => {
            let raw = ports.port().ok_or_else(|| {
                Error::Config(format!(
                    "no target given and no port in environment variable {}",
                    config.target.port_env
                ))
            })?;
            let port: u16 = raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("ambient port '{}' is not a valid port", raw)))?;
            Ok(ResolvedTarget {
                origin: loopback_origin(SocketAddr::new(loopback(config)?, port))?,
                server: None,
            })
        }
    }
}

fn loopback(config: &ClientConfig) -> Result<IpAddr> {
    config
        .target
        .host
        .parse()
        .map_err(|_| Error::Config(format!("target host '{}' is not an IP address", config.target.host)))
}

fn loopback_origin(addr: SocketAddr) -> Result<Url> {
    let origin = format!("http://{}", addr);
    Url::parse(&origin).map_err(|e| Error::invalid_url(origin, e))
}
