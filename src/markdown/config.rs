//! Handler configuration and provisioning.
//!
//! A handler block is configured in one of two shapes:
//! - `scheme` only: every response it sees is rendered
//! - `template` plus `mime_types`: only responses whose `Content-Type`
//!   contains one of the configured types are rendered
//!
//! Both shapes provision into a single [`RenderConfig`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::markdown::template::DEFAULT_SELECTOR;

/// MIME types matched when a MIME-aware block lists none.
pub const DEFAULT_MIME_TYPES: &[&str] = &["text/markdown"];

/// Default cap on a captured response body (10 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// One `markdown` handler block as written in configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct HandlerConfig {
    /// Template selector for the always-render shape.
    pub scheme: Option<String>,

    /// Template selector for the MIME-aware shape.
    pub template: Option<String>,

    /// Content-Type substrings that make a response eligible.
    pub mime_types: Option<Vec<String>>,

    /// Host header to match (exact, case-insensitive).
    pub host: Option<String>,

    /// Request path prefix to match.
    pub path_prefix: Option<String>,

    /// Largest response body that will be buffered.
    pub max_body_bytes: usize,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            scheme: None,
            template: None,
            mime_types: None,
            host: None,
            path_prefix: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl HandlerConfig {
    /// Block used when none is configured: the default template, applied
    /// only to responses with a default MIME type.
    pub fn fallback() -> Self {
        Self {
            template: Some(DEFAULT_SELECTOR.to_string()),
            mime_types: Some(DEFAULT_MIME_TYPES.iter().map(|s| s.to_string()).collect()),
            ..Self::default()
        }
    }
}

/// Rule deciding whether a response is intercepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// Every response is buffered.
    AlwaysEligible,
    /// Only responses whose `Content-Type` contains one of these substrings.
    MimeFiltered(Vec<String>),
}

/// Provisioned rendering configuration. `selector` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub selector: String,
    pub eligibility: Eligibility,
}

/// Host-provided context for provisioning.
#[derive(Debug, Clone)]
pub struct ProvisionContext {
    /// Directory template paths are resolved against.
    pub working_dir: PathBuf,
}

impl ProvisionContext {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// Context rooted at the process working directory.
    pub fn current() -> Result<Self, ProvisionError> {
        let dir = std::env::current_dir().map_err(ProvisionError::WorkingDir)?;
        Ok(Self::new(dir))
    }
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("cannot determine working directory: {0}")]
    WorkingDir(#[source] std::io::Error),

    #[error(transparent)]
    Invalid(#[from] HandlerValidationError),
}

/// Error returned by a module's validation hook.
#[derive(Debug, Error)]
#[error("invalid handler configuration: {0}")]
pub struct HandlerValidationError(pub String);

/// Applies defaults and produces the runtime configuration.
pub trait Provisioner {
    type Output;

    fn provision(&self, ctx: &ProvisionContext) -> Result<Self::Output, ProvisionError>;
}

/// Checks a configuration after provisioning.
pub trait Validator {
    fn validate(&self) -> Result<(), HandlerValidationError>;
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl Provisioner for HandlerConfig {
    type Output = RenderConfig;

    fn provision(&self, _ctx: &ProvisionContext) -> Result<RenderConfig, ProvisionError> {
        let mime_aware = self.template.is_some() || self.mime_types.is_some();

        let config = if mime_aware {
            if self.scheme.is_some() {
                tracing::warn!(
                    scheme = ?self.scheme,
                    template = ?self.template,
                    "Both scheme and template set, ignoring scheme"
                );
            }
            let mime_types = match &self.mime_types {
                Some(types) if !types.is_empty() => types.clone(),
                _ => DEFAULT_MIME_TYPES.iter().map(|s| s.to_string()).collect(),
            };
            RenderConfig {
                selector: non_empty(&self.template).unwrap_or(DEFAULT_SELECTOR).to_string(),
                eligibility: Eligibility::MimeFiltered(mime_types),
            }
        } else {
            RenderConfig {
                selector: non_empty(&self.scheme).unwrap_or(DEFAULT_SELECTOR).to_string(),
                eligibility: Eligibility::AlwaysEligible,
            }
        };

        tracing::info!(
            selector = %config.selector,
            eligibility = ?config.eligibility,
            path_prefix = ?self.path_prefix,
            host = ?self.host,
            "Provisioned markdown handler"
        );
        Ok(config)
    }
}

impl Validator for RenderConfig {
    fn validate(&self) -> Result<(), HandlerValidationError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ProvisionContext {
        ProvisionContext::new(".")
    }

    #[test]
    fn test_fallback_block_filters_on_mime_type() {
        let config = HandlerConfig::fallback().provision(&ctx()).unwrap();
        assert_eq!(config.selector, DEFAULT_SELECTOR);
        assert_eq!(
            config.eligibility,
            Eligibility::MimeFiltered(vec!["text/markdown".to_string()])
        );
    }

    #[test]
    fn test_scheme_defaults() {
        let config = HandlerConfig::default().provision(&ctx()).unwrap();
        assert_eq!(config.selector, "simple");
        assert_eq!(config.eligibility, Eligibility::AlwaysEligible);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_scheme_is_defaulted() {
        let handler = HandlerConfig {
            scheme: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(handler.provision(&ctx()).unwrap().selector, "simple");
    }

    #[test]
    fn test_explicit_scheme() {
        let handler = HandlerConfig {
            scheme: Some("github".into()),
            ..Default::default()
        };
        let config = handler.provision(&ctx()).unwrap();
        assert_eq!(config.selector, "github");
        assert_eq!(config.eligibility, Eligibility::AlwaysEligible);
    }

    #[test]
    fn test_template_shape_defaults_mime_types() {
        let handler = HandlerConfig {
            template: Some("page.html".into()),
            ..Default::default()
        };
        let config = handler.provision(&ctx()).unwrap();
        assert_eq!(config.selector, "page.html");
        assert_eq!(
            config.eligibility,
            Eligibility::MimeFiltered(vec!["text/markdown".to_string()])
        );
    }

    #[test]
    fn test_mime_types_alone_select_mime_shape() {
        let handler = HandlerConfig {
            mime_types: Some(vec!["text/x-markdown".into()]),
            scheme: Some("github".into()),
            ..Default::default()
        };
        let config = handler.provision(&ctx()).unwrap();
        assert_eq!(config.selector, "simple");
        assert_eq!(
            config.eligibility,
            Eligibility::MimeFiltered(vec!["text/x-markdown".to_string()])
        );
    }

    #[test]
    fn test_deserialize_from_toml() {
        let handler: HandlerConfig = toml::from_str(
            r#"
            template = "page.html"
            mime_types = ["text/markdown", "text/plain"]
            path_prefix = "/docs"
            "#,
        )
        .unwrap();
        assert_eq!(handler.template.as_deref(), Some("page.html"));
        assert_eq!(handler.path_prefix.as_deref(), Some("/docs"));
        assert_eq!(handler.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }
}
