//! Target resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Initiator
//!     Handler(Router) → server.rs (bind port 0, serve until closed)
//!     Port(u16)       → http://<host>:<port>
//!     Origin(String)  → used verbatim
//!     Ambient         → initiator.rs PortSource, read at execution time
//!     → resolver.rs (ResolvedTarget: origin + optional server)
//!     → origin.join(path)
//! ```
//!
//! # Design Decisions
//! - One ephemeral server per request; never shared
//! - The ambient port is read on every resolution, never cached
//! - Closing a server is idempotent; only the first close does anything

pub mod initiator;
pub mod resolver;
pub mod server;

pub use initiator::{EnvPort, FixedPort, Initiator, PortSource};
pub use resolver::{resolve, ResolvedTarget};
pub use server::EphemeralServer;
