//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (shutdown timeout > 0)
//! - Check the target host is a usable IP address
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use std::net::IpAddr;

use crate::config::schema::ClientConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.target.host.parse::<IpAddr>().is_err() {
        errors.push(ValidationError {
            field: "target.host",
            message: format!("'{}' is not an IP address", config.target.host),
        });
    }

    if config.target.port_env.trim().is_empty() {
        errors.push(ValidationError {
            field: "target.port_env",
            message: "must not be empty".to_string(),
        });
    }

    if config.server.shutdown_timeout_ms == 0 {
        errors.push(ValidationError {
            field: "server.shutdown_timeout_ms",
            message: "must be greater than zero".to_string(),
        });
    }

    if let Some(agent) = &config.transport.user_agent {
        if agent.chars().any(|c| c.is_control()) {
            errors.push(ValidationError {
                field: "transport.user_agent",
                message: "must not contain control characters".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = ClientConfig::default();
        config.target.host = "localhost".into();
        config.target.port_env = " ".into();
        config.server.shutdown_timeout_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["target.host", "target.port_env", "server.shutdown_timeout_ms"]
        );
    }
}
