//! Errors raised while rewriting a response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::markdown::render::RenderError;

/// Boxed error from a response body stream.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum MarkdownError {
    #[error("failed to render markdown: {0}")]
    Render(#[from] RenderError),

    #[error("failed to read response body: {0}")]
    UpstreamBody(#[source] BoxError),

    #[error("response body exceeded {limit} bytes")]
    BodyTooLarge { limit: usize },
}

impl MarkdownError {
    /// Status code reported to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            MarkdownError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MarkdownError::UpstreamBody(_) | MarkdownError::BodyTooLarge { .. } => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for MarkdownError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(error = %self, status = %status, "Markdown rewrite failed");
        // Generic text only; details stay in the log.
        let reason = status.canonical_reason().unwrap_or("Error");
        (status, reason).into_response()
    }
}
