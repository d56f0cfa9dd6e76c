//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    EmptyTargetHost,
    ZeroTimeout(&'static str),
    InvalidMetricsAddress(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address is not a valid socket address: {}", addr)
            }
            ValidationError::EmptyTargetHost => write!(f, "target.host must not be empty"),
            ValidationError::ZeroTimeout(field) => write!(f, "{} must be greater than zero", field),
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(f, "observability.metrics_address is not a valid socket address: {}", addr)
            }
        }
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.target.host.trim().is_empty() {
        errors.push(ValidationError::EmptyTargetHost);
    }

    if config.timeouts.request_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }
    if config.timeouts.upstream_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout("timeouts.upstream_secs"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
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
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        config.target.host = "".to_string();
        config.timeouts.upstream_secs = Some(0);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::EmptyTargetHost));
        assert!(errors.contains(&ValidationError::ZeroTimeout("timeouts.upstream_secs")));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = ProxyConfig::default();
        config.observability.metrics_address = "bogus".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidMetricsAddress("bogus".to_string())]
        );
    }
}
