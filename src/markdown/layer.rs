//! Tower layer wiring the interceptor and pipeline in front of a service.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{header, Request, Response};
use bytes::Bytes;
use futures_util::future::BoxFuture;
use http_body::Body as HttpBody;
use tower::{Layer, Service};

use crate::markdown::config::{
    HandlerConfig, ProvisionContext, ProvisionError, Provisioner, Validator,
};
use crate::markdown::error::BoxError;
use crate::markdown::pool::BufferPool;
use crate::markdown::render::{ComrakRenderer, Renderer};
use crate::markdown::rewrite::{page_title, MarkdownHandler};
use crate::observability::metrics;
use crate::routing::build_matcher;

struct Shared {
    handlers: Vec<MarkdownHandler>,
    renderer: Arc<dyn Renderer>,
    pool: Arc<BufferPool>,
}

/// Layer rendering markdown responses of the wrapped service.
#[derive(Clone)]
pub struct MarkdownLayer {
    shared: Arc<Shared>,
}

impl MarkdownLayer {
    /// Layer with the default comrak renderer.
    pub fn new(handlers: Vec<MarkdownHandler>) -> Self {
        Self::with_renderer(handlers, Arc::new(ComrakRenderer::new()))
    }

    pub fn with_renderer(handlers: Vec<MarkdownHandler>, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            shared: Arc::new(Shared {
                handlers,
                renderer,
                pool: Arc::new(BufferPool::new()),
            }),
        }
    }

    /// Provision and validate every block, in order.
    pub fn provision(
        configs: &[HandlerConfig],
        ctx: &ProvisionContext,
    ) -> Result<Vec<MarkdownHandler>, ProvisionError> {
        configs
            .iter()
            .map(|config| {
                let render = config.provision(ctx)?;
                render.validate()?;
                Ok(MarkdownHandler::new(
                    build_matcher(config.host.as_deref(), config.path_prefix.as_deref()),
                    render,
                    ctx.working_dir.clone(),
                    config.max_body_bytes,
                ))
            })
            .collect()
    }

    pub fn handlers(&self) -> &[MarkdownHandler] {
        &self.shared.handlers
    }
}

impl std::fmt::Debug for MarkdownLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkdownLayer")
            .field("handlers", &self.shared.handlers)
            .finish_non_exhaustive()
    }
}

impl<S> Layer<S> for MarkdownLayer {
    type Service = MarkdownService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MarkdownService {
            inner,
            shared: self.shared.clone(),
        }
    }
}

/// Service produced by [`MarkdownLayer`].
#[derive(Clone)]
pub struct MarkdownService<S> {
    inner: S,
    shared: Arc<Shared>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for MarkdownService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: HttpBody<Data = Bytes> + Send + 'static,
    ResBody::Error: Into<BoxError>,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        // Take the readied service, leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let shared = self.shared.clone();

        let selected = shared
            .handlers
            .iter()
            .position(|h| h.applies_to(&req))
            .map(|idx| (idx, page_title(&req)));

        // The pipeline reads the body as plain text.
        if selected.is_some() {
            req.headers_mut().remove(header::ACCEPT_ENCODING);
        }

        Box::pin(async move {
            let response = match inner.call(req).await {
                Ok(response) => response,
                Err(e) => {
                    if selected.is_some() {
                        tracing::warn!("Downstream handler failed, response not rewritten");
                        metrics::record_markdown_outcome("upstream_error");
                    }
                    return Err(e);
                }
            };

            match selected {
                Some((idx, title)) => {
                    let handler = &shared.handlers[idx];
                    Ok(handler
                        .process(response, &title, shared.renderer.as_ref(), &shared.pool)
                        .await)
                }
                None => Ok(response.map(Body::new)),
            }
        })
    }
}
