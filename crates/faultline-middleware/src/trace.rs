//! Tracing middleware

use async_trait::async_trait;
use faultline_core::{Body, IgnoreSet, Middleware, Next, Result};
use http::{Request, Response};
use tracing::Instrument;

/// Wraps each non-ignored request in a `tracing` span annotated with
/// method and path; the response status is recorded on the span before
/// it closes. Only composed into the pipeline when tracing is enabled
/// in configuration.
#[derive(Debug, Clone)]
pub struct TraceMiddleware {
    ignore: IgnoreSet,
}

impl TraceMiddleware {
    /// Create the element.
    pub fn new(ignore: IgnoreSet) -> Self {
        Self { ignore }
    }
}

#[async_trait]
impl Middleware for TraceMiddleware {
    async fn handle(&self, req: Request<Body>, next: Next) -> Result<Response<Body>> {
        let path = req.uri().path();

        if self.ignore.matches(path) {
            return next.run(req).await;
        }

        let span = tracing::info_span!(
            "http_request",
            method = %req.method(),
            path = %path,
            status = tracing::field::Empty,
        );

        let response = next.run(req).instrument(span.clone()).await;

        if let Ok(resp) = &response {
            span.record("status", resp.status().as_u16() as u64);
        }

        response
    }
}
