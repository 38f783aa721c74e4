//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → shared via Arc by every request a client creates
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so `ClientConfig::default()` needs no file
//! - Validation separates syntactic (serde) from semantic checks
//! - The ambient port is NOT part of the config; only the variable name is

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ClientConfig, ServerConfig, TargetConfig, TransportConfig};
