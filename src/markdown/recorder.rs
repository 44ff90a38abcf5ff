//! Response interception.
//!
//! # Responsibilities
//! - Decide once, on the response head, whether to buffer
//! - Pass ineligible responses through untouched
//! - Pass content-encoded responses through untouched
//! - Drain eligible bodies, in however many frames, into a pooled buffer
//!
//! # Data Flow
//! ```text
//! Response<B> from downstream
//!     → Eligibility::is_eligible(status, headers)
//!     → false: Recorded::PassThrough(response)
//!     → true:  frames → PooledBuffer → Recorded::Buffered
//! ```

use std::sync::Arc;

use axum::http::{header, response::Parts, HeaderMap, Response, StatusCode};
use bytes::{Buf, BufMut};
use http_body::Body as HttpBody;
use http_body_util::BodyExt;

use crate::markdown::config::Eligibility;
use crate::markdown::error::{BoxError, MarkdownError};
use crate::markdown::pool::{BufferPool, PooledBuffer};

impl Eligibility {
    /// Evaluate the predicate against a tentative response head.
    pub fn is_eligible(&self, _status: StatusCode, headers: &HeaderMap) -> bool {
        match self {
            Eligibility::AlwaysEligible => true,
            Eligibility::MimeFiltered(types) => headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|ct| types.iter().any(|t| ct.contains(t.as_str())))
                .unwrap_or(false),
        }
    }
}

/// Whether the body carries a `Content-Encoding` other than `identity`.
pub fn is_content_encoded(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::CONTENT_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .any(|coding| !coding.is_empty() && !coding.eq_ignore_ascii_case("identity"))
}

/// A captured response: status, headers and the whole body.
#[derive(Debug)]
pub struct BufferedResponse {
    pub parts: Parts,
    pub body: PooledBuffer,
}

/// Outcome of intercepting one response.
#[derive(Debug)]
pub enum Recorded<B> {
    /// Not eligible; the downstream response, untouched.
    PassThrough(Response<B>),
    /// Eligible; held in memory until the pipeline flushes it.
    Buffered(BufferedResponse),
}

impl<B> Recorded<B> {
    pub fn is_buffered(&self) -> bool {
        matches!(self, Recorded::Buffered(_))
    }
}

/// Intercept `response`, buffering its body when `eligibility` accepts it.
///
/// A body error or a body over `limit` bytes discards what was captured.
pub async fn record<B>(
    response: Response<B>,
    eligibility: &Eligibility,
    pool: &Arc<BufferPool>,
    limit: usize,
) -> Result<Recorded<B>, MarkdownError>
where
    B: HttpBody,
    B::Error: Into<BoxError>,
{
    if !eligibility.is_eligible(response.status(), response.headers()) {
        return Ok(Recorded::PassThrough(response));
    }
    if is_content_encoded(response.headers()) {
        tracing::debug!("Eligible response is content-encoded, passing through");
        return Ok(Recorded::PassThrough(response));
    }

    let (parts, body) = response.into_parts();
    let mut buf = pool.acquire();
    let mut body = std::pin::pin!(body);

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|e| MarkdownError::UpstreamBody(e.into()))?;
        if let Ok(data) = frame.into_data() {
            if buf.len() + data.remaining() > limit {
                return Err(MarkdownError::BodyTooLarge { limit });
            }
            buf.put(data);
        }
    }

    Ok(Recorded::Buffered(BufferedResponse { parts, body: buf }))
}
