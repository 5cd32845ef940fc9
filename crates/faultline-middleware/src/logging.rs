//! Request logging middleware

use async_trait::async_trait;
use faultline_core::{Body, IgnoreSet, Middleware, Next, Result};
use http::{Request, Response};
use std::time::Instant;
use tracing::{info, warn};

/// Logs method, path, status, and elapsed latency of every served
/// request once the rest of the pipeline has produced a response.
/// Requests on ignored paths are served silently.
#[derive(Debug, Clone)]
pub struct RequestLogger {
    ignore: IgnoreSet,
}

impl RequestLogger {
    /// Create a logger with the given ignore set.
    pub fn new(ignore: IgnoreSet) -> Self {
        Self { ignore }
    }
}

#[async_trait]
impl Middleware for RequestLogger {
    async fn handle(&self, req: Request<Body>, next: Next) -> Result<Response<Body>> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let ignored = self.ignore.matches(&path);

        let start = Instant::now();
        let response = next.run(req).await;
        let latency = start.elapsed();

        if ignored {
            return response;
        }

        match &response {
            Ok(resp) => {
                info!(
                    method = %method,
                    path = %path,
                    status = resp.status().as_u16(),
                    latency_ms = latency.as_millis() as u64,
                    "Request served"
                );
            }
            Err(e) => {
                warn!(
                    method = %method,
                    path = %path,
                    error = %e,
                    latency_ms = latency.as_millis() as u64,
                    "Request failed"
                );
            }
        }

        response
    }
}
