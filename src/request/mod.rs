//! Request descriptor subsystem.
//!
//! # Data Flow
//! ```text
//! HttpTest::get/post/... → builder.rs (TestRequest: fluent configuration)
//!     → options.rs (headers, query, body policy, redirect policy)
//!     → .await → execute.rs
//!         → target::resolve (origin, maybe an ephemeral server)
//!         → cookie merge (caller header into jar, jar into outgoing header)
//!         → Transport::send (hooks harvest Set-Cookie at every hop)
//!         → server closed (exactly once, success or failure)
//!         → assertions::run (in order, first failure wins)
//!     → Result<TestResponse>
//! ```
//!
//! # Design Decisions
//! - Nothing runs until the request is awaited, so chained calls always land first
//! - Awaiting consumes the request; `execute(&mut self)` drains the expectation queue
//! - Builder-time errors are deferred and reported when the request runs

pub mod builder;
pub mod execute;
pub mod options;

pub use builder::TestRequest;
pub use options::{Payload, RequestBody, RequestOptions};
