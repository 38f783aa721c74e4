//! Throwaway server hosting an in-process handler for a single request.
//!
//! # Responsibilities
//! - Bind an OS-assigned port on the loopback host
//! - Serve the handler until the owning request settles
//! - Shut down exactly once, whichever path asks first
//!
//! # Design Decisions
//! - Graceful shutdown through a oneshot, bounded by a drain timeout
//! - Dropping an unclosed server aborts its task so nothing leaks on panic

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::{Error, Result};

/// A listening server owned by exactly one request.
#[derive(Debug)]
pub struct EphemeralServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<std::io::Result<()>>>,
    drain_timeout: Duration,
}

impl EphemeralServer {
    /// Start serving `router` on `host:0`.
    pub async fn start(router: Router, host: IpAddr, config: &ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::new(host, 0))
            .await
            .map_err(Error::Server)?;
        let addr = listener.local_addr().map_err(Error::Server)?;

        let app = if config.trace_requests {
            router.layer(TraceLayer::new_for_http())
        } else {
            router
        };

        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await
        });

        tracing::debug!(address = %addr, "Ephemeral server listening");

        Ok(Self {
            addr,
            shutdown: Some(tx),
            task: Some(task),
            drain_timeout: Duration::from_millis(config.shutdown_timeout_ms),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_none()
    }

    /// Stop the server and wait for it to drain.
    ///
    /// Returns `true` only for the call that actually closed it.
    pub async fn close(&mut self) -> bool {
        let Some(tx) = self.shutdown.take() else {
            return false;
        };
        let _ = tx.send(());

        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(self.drain_timeout, &mut task).await {
                Ok(Ok(Ok(()))) => {}
                Ok(Ok(Err(e))) => {
                    tracing::warn!(address = %self.addr, error = %e, "Ephemeral server exited with error");
                }
                Ok(Err(e)) => {
                    tracing::warn!(address = %self.addr, error = %e, "Ephemeral server task failed");
                }
                Err(_) => {
                    tracing::warn!(address = %self.addr, timeout = ?self.drain_timeout, "Ephemeral server did not drain, aborting");
                    task.abort();
                }
            }
        }

        tracing::debug!(address = %self.addr, "Ephemeral server closed");
        true
    }
}

impl Drop for EphemeralServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
