//! Markdown rendering proxy library.
//!
//! `markdown` holds the response-rewriting layer; the other modules are the
//! proxy host that runs it.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod markdown;
pub mod observability;
pub mod routing;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use markdown::{MarkdownLayer, MarkdownService};
