//! Metrics recording middleware

use async_trait::async_trait;
use faultline_core::{Body, IgnoreSet, Middleware, Next, Result};
use faultline_metrics::MetricsCollector;
use http::{Request, Response};
use std::time::Instant;

/// Records one latency observation per served request, labeled by
/// method, path, and response status. Requests on ignored paths (the
/// `/metrics` scrape endpoint among them) are served without being
/// recorded.
#[derive(Debug, Clone)]
pub struct MetricsMiddleware {
    collector: MetricsCollector,
    ignore: IgnoreSet,
}

impl MetricsMiddleware {
    /// Create the element around a shared collector.
    pub fn new(collector: MetricsCollector, ignore: IgnoreSet) -> Self {
        Self { collector, ignore }
    }

    /// The collector this element records into.
    pub fn collector(&self) -> &MetricsCollector {
        &self.collector
    }
}

#[async_trait]
impl Middleware for MetricsMiddleware {
    async fn handle(&self, req: Request<Body>, next: Next) -> Result<Response<Body>> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let ignored = self.ignore.matches(&path);

        let start = Instant::now();
        let response = next.run(req).await;

        if !ignored {
            if let Ok(resp) = &response {
                self.collector
                    .record(method, &path, resp.status().as_u16(), start.elapsed());
            }
        }

        response
    }
}
