//! The rewrite pipeline.
//!
//! # Data Flow
//! ```text
//! Response from downstream
//!     → recorder.rs (pass through or buffer)
//!     → render.rs (markdown → HTML fragment)
//!     → template.rs (resolve, fill title and body)
//!     → header rewrite
//!     → final Response
//! ```
//!
//! # Design Decisions
//! - A render failure is a generic 500; no partial output is sent
//! - Buffered empty bodies are returned untouched
//! - The captured status code is kept

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::OriginalUri;
use axum::http::{header, response::Parts, HeaderValue, Request, Response};
use axum::response::IntoResponse;
use bytes::Bytes;
use http_body::Body as HttpBody;
use percent_encoding::percent_decode_str;

use crate::markdown::config::RenderConfig;
use crate::markdown::error::{BoxError, MarkdownError};
use crate::markdown::pool::BufferPool;
use crate::markdown::recorder::{record, BufferedResponse, Recorded};
use crate::markdown::render::Renderer;
use crate::markdown::template;
use crate::observability::metrics;
use crate::routing::matcher::Matcher;

/// Content type of every rewritten response.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// A provisioned handler block: where it applies and how it renders.
pub struct MarkdownHandler {
    matcher: Box<dyn Matcher>,
    config: RenderConfig,
    template_dir: PathBuf,
    max_body_bytes: usize,
}

impl MarkdownHandler {
    pub fn new(
        matcher: Box<dyn Matcher>,
        config: RenderConfig,
        template_dir: impl Into<PathBuf>,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            matcher,
            config,
            template_dir: template_dir.into(),
            max_body_bytes,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Whether this block applies to the request.
    pub fn applies_to<B>(&self, req: &Request<B>) -> bool {
        self.matcher.matches(req.uri(), req.headers())
    }

    /// Run the pipeline over a downstream response.
    pub async fn process<B>(
        &self,
        response: Response<B>,
        title: &str,
        renderer: &dyn Renderer,
        pool: &Arc<BufferPool>,
    ) -> Response<Body>
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let recorded = match record(response, &self.config.eligibility, pool, self.max_body_bytes).await {
            Ok(recorded) => recorded,
            Err(e) => {
                metrics::record_markdown_outcome("upstream_error");
                return e.into_response();
            }
        };

        let BufferedResponse { parts, body } = match recorded {
            Recorded::PassThrough(response) => {
                metrics::record_markdown_outcome("passthrough");
                return response.map(Body::new);
            }
            Recorded::Buffered(buffered) => buffered,
        };

        if body.is_empty() {
            metrics::record_markdown_outcome("empty");
            return Response::from_parts(parts, Body::empty());
        }

        let start = Instant::now();
        let rendered = match std::str::from_utf8(&body[..])
            .map_err(Into::into)
            .and_then(|text| renderer.render(text))
        {
            Ok(html) => html,
            Err(e) => {
                metrics::record_markdown_outcome("render_error");
                return MarkdownError::Render(e).into_response();
            }
        };
        drop(body);
        metrics::record_render_duration(start);

        let tmpl = template::resolve(&self.config.selector, &self.template_dir).await;
        let html = template::fill(&tmpl, title, &rendered);

        tracing::debug!(
            selector = %self.config.selector,
            title = %title,
            status = %parts.status,
            bytes = html.len(),
            "Rendered markdown response"
        );
        metrics::record_markdown_outcome("rendered");
        finish(parts, html)
    }
}

impl std::fmt::Debug for MarkdownHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkdownHandler")
            .field("matcher", &self.matcher)
            .field("config", &self.config)
            .field("template_dir", &self.template_dir)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

/// Replace the body and fix up the headers that described the old one.
pub fn finish(mut parts: Parts, html: String) -> Response<Body> {
    let headers = &mut parts.headers;
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(html.len()));
    // Ranges and validators described the source, not this rendering.
    headers.remove(header::ACCEPT_RANGES);
    headers.remove(header::LAST_MODIFIED);
    headers.remove(header::ETAG);
    // The body is now a single uncompressed buffer of known length.
    headers.remove(header::TRANSFER_ENCODING);
    headers.remove(header::CONTENT_ENCODING);

    Response::from_parts(parts, Body::from(html))
}

/// Title for a request: last segment of the original request path.
///
/// Uses the `OriginalUri` extension when the host rewrote the URI and
/// falls back to the request's own path when it is absent. The path is
/// percent-decoded before the segment is taken, and the result is
/// HTML-escaped.
pub fn page_title<B>(req: &Request<B>) -> String {
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|original| original.0.path())
        .unwrap_or_else(|| req.uri().path());
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    escape_html(base_name(&decoded))
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Last element of a slash-separated path, ignoring trailing slashes.
///
/// Empty paths yield `"."`, all-slash paths yield `"/"`.
pub fn base_name(path: &str) -> &str {
    if path.is_empty() {
        return ".";
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    match trimmed.rfind('/') {
        Some(at) => &trimmed[at + 1..],
        None => trimmed,
    }
}
