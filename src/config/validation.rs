//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the remote base URL and credentials
//! - Validate value ranges (timeouts > 0, concurrency > 0, backoff bounds)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AgentConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is handed to any subsystem

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AgentConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &AgentConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let dry_run = config.controller.dry_run;

    if !dry_run {
        match url::Url::parse(&config.remote.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::new(
                "remote.base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new("remote.base_url", e.to_string())),
        }

        if config.remote.token.trim().is_empty() {
            errors.push(ValidationError::new("remote.token", "must not be empty"));
        }
    }

    if config.remote.request_timeout_secs == 0 {
        errors.push(ValidationError::new("remote.request_timeout_secs", "must be > 0"));
    }
    if config.remote.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("remote.connect_timeout_secs", "must be > 0"));
    }

    let prefix = config.annotations.prefix.trim_end_matches('/');
    if prefix.is_empty() || prefix.contains(char::is_whitespace) {
        errors.push(ValidationError::new(
            "annotations.prefix",
            "must be a non-empty DNS-style prefix",
        ));
    }

    if config.controller.max_concurrent == 0 {
        errors.push(ValidationError::new("controller.max_concurrent", "must be > 0"));
    }
    if config.controller.retry_base_delay_ms == 0 {
        errors.push(ValidationError::new("controller.retry_base_delay_ms", "must be > 0"));
    }
    if config.controller.max_concurrent > usize::from(u16::MAX) {
        errors.push(ValidationError::new("controller.max_concurrent", "must be <= 65535"));
    }
    if config.controller.resync_interval_secs == 0 {
        errors.push(ValidationError::new("controller.resync_interval_secs", "must be > 0"));
    }
    if config.controller.retry_base_delay_ms > config.controller.retry_max_delay_ms {
        errors.push(ValidationError::new(
            "controller.retry_max_delay_ms",
            "must be >= retry_base_delay_ms",
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
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

    fn valid() -> AgentConfig {
        let mut config = AgentConfig::default();
        config.remote.token = "secret".to_string();
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.remote.base_url = "not a url".to_string();
        config.remote.token = " ".to_string();
        config.controller.max_concurrent = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["remote.base_url", "remote.token", "controller.max_concurrent"]
        );
    }

    #[test]
    fn test_dry_run_skips_credentials() {
        let mut config = AgentConfig::default();
        config.controller.dry_run = true;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_backoff_bounds() {
        let mut config = valid();
        config.controller.retry_base_delay_ms = 5_000;
        config.controller.retry_max_delay_ms = 1_000;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "controller.retry_max_delay_ms");
    }
}
