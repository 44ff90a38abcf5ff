//! Markdown response rendering.
//!
//! # Data Flow
//! ```text
//! Request
//!     → layer.rs (pick the first handler block whose matcher accepts it)
//!     → downstream service produces a response
//!     → recorder.rs (eligibility on the response head; buffer or pass through)
//!     → rewrite.rs (render → template → header rewrite)
//!     → Response to client
//! ```
//!
//! # Design Decisions
//! - Responses are fully buffered before anything is decided about the body
//! - One shared buffer pool, buffers returned on every exit path
//! - Template lookup never fails; misses render the bare body
//! - Downstream errors are returned unchanged

pub mod config;
pub mod error;
pub mod layer;
pub mod pool;
pub mod recorder;
pub mod render;
pub mod rewrite;
pub mod template;

pub use config::{Eligibility, HandlerConfig, ProvisionContext, RenderConfig};
pub use error::MarkdownError;
pub use layer::{MarkdownLayer, MarkdownService};
pub use render::{ComrakRenderer, RenderError, Renderer};
pub use rewrite::{MarkdownHandler, HTML_CONTENT_TYPE};
