//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! request/execute.rs  → span `test_request` (request_id, method, path)
//! transport/client.rs → hop / redirect events
//! target/server.rs    → ephemeral server start / close events
//!     → logging.rs subscriber (stderr), filtered by RUST_LOG
//! ```
//!
//! # Design Decisions
//! - The library only emits `tracing` events; installing a subscriber is the caller's choice
//! - Every event inside a request carries its UUID through the span

pub mod logging;
