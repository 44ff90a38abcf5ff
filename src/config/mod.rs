//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)             directive file (optional)
//!     → loader.rs                    → directive.rs (markdown blocks)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → markdown blocks provisioned into the MarkdownLayer
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod directive;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_directives, ConfigError};
pub use schema::{ListenerConfig, ObservabilityConfig, ProxyConfig, TimeoutConfig, UpstreamConfig};
