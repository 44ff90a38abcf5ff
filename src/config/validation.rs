//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges
//! - Validate markdown handler blocks
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("markdown[{index}].path_prefix '{prefix}' must start with '/'")]
    RelativePathPrefix { index: usize, prefix: String },

    #[error("markdown[{index}].max_body_bytes must be greater than zero")]
    ZeroBodyLimit { index: usize },

    #[error("markdown[{index}].mime_types contains an empty entry")]
    EmptyMimeType { index: usize },
}

/// Validate a loaded configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("listener.bind_address", &config.listener.bind_address),
        ("upstream.address", &config.upstream.address),
    ] {
        if value.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                field,
                value: value.clone(),
            });
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    for (index, handler) in config.markdown.iter().enumerate() {
        if let Some(prefix) = &handler.path_prefix {
            if !prefix.starts_with('/') {
                errors.push(ValidationError::RelativePathPrefix {
                    index,
                    prefix: prefix.clone(),
                });
            }
        }
        if handler.max_body_bytes == 0 {
            errors.push(ValidationError::ZeroBodyLimit { index });
        }
        if let Some(types) = &handler.mime_types {
            if types.iter().any(|t| t.is_empty()) {
                errors.push(ValidationError::EmptyMimeType { index });
            }
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
    use crate::markdown::HandlerConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.upstream.address = "not-an-address".into();
        config.timeouts.request_secs = 0;
        config.markdown.push(HandlerConfig {
            path_prefix: Some("docs".into()),
            max_body_bytes: 0,
            mime_types: Some(vec![String::new()]),
            ..Default::default()
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::ZeroTimeout));
        assert!(errors.contains(&ValidationError::ZeroBodyLimit { index: 0 }));
    }
}
