//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::directive::{parse_directives, DirectiveError};
use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Directive error: {0}")]
    Directive(#[from] DirectiveError),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ProxyConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Append the handler blocks of a directive file to `config`, then revalidate.
pub fn load_directives(config: &mut ProxyConfig, path: &Path) -> Result<(), ConfigError> {
    let content = fs::read_to_string(path)?;
    let handlers = parse_directives(&content)?;
    tracing::info!(path = ?path, blocks = handlers.len(), "Loaded markdown directives");
    config.markdown.extend(handlers);

    validate_config(config).map_err(ConfigError::Validation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_and_directives() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("proxy.toml");
        std::fs::write(
            &config_path,
            "[upstream]\naddress = \"127.0.0.1:4000\"\n\n[[markdown]]\nscheme = \"simple\"\n",
        )
        .unwrap();
        let directives_path = dir.path().join("Markdownfile");
        std::fs::write(&directives_path, "markdown /docs {\n  template page.html\n}\n").unwrap();

        let mut config = load_config(&config_path).unwrap();
        assert_eq!(config.markdown.len(), 1);

        load_directives(&mut config, &directives_path).unwrap();
        assert_eq!(config.markdown.len(), 2);
        assert_eq!(config.markdown[1].path_prefix.as_deref(), Some("/docs"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxy.toml");
        std::fs::write(&path, "[timeouts]\nrequest_secs = 0\n").unwrap();

        match load_config(&path) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors, vec![ValidationError::ZeroTimeout]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/proxy.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
