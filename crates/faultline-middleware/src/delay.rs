//! Delay injection middleware

use crate::route_key;
use async_trait::async_trait;
use faultline_core::{Body, IgnoreSet, Middleware, Next, Result};
use faultline_fault::DelayStore;
use http::{Request, Response};
use std::sync::Arc;

/// Injects latency ahead of the real handler: an unconditional base
/// jitter sleep plus, when a delay spec is installed for the endpoint
/// and its probability fires, the configured duration.
///
/// Requests on ignored paths skip the spec lookup entirely; whether
/// they still receive base jitter is a configuration choice
/// (`jitter_ignored_paths`).
#[derive(Debug, Clone)]
pub struct DelayMiddleware {
    store: Arc<DelayStore>,
    ignore: IgnoreSet,
    api_prefix: String,
    jitter_ignored_paths: bool,
}

impl DelayMiddleware {
    /// Create the element.
    pub fn new(
        store: Arc<DelayStore>,
        ignore: IgnoreSet,
        api_prefix: impl Into<String>,
        jitter_ignored_paths: bool,
    ) -> Self {
        Self {
            store,
            ignore,
            api_prefix: api_prefix.into(),
            jitter_ignored_paths,
        }
    }
}

#[async_trait]
impl Middleware for DelayMiddleware {
    async fn handle(&self, req: Request<Body>, next: Next) -> Result<Response<Body>> {
        let path = req.uri().path();
        let ignored = self.ignore.matches(path);

        if !ignored || self.jitter_ignored_paths {
            let jitter = self.store.sample_jitter();
            if !jitter.is_zero() {
                tokio::time::sleep(jitter).await;
            }
        }

        if !ignored {
            if let Some(key) = route_key(&self.api_prefix, req.method(), path) {
                if let Some(spec) = self.store.get(&key) {
                    if spec.fires() {
                        tracing::debug!(
                            key = %key,
                            duration_ms = spec.duration.as_millis() as u64,
                            "Injecting delay"
                        );
                        tokio::time::sleep(spec.duration).await;
                    }
                }
            }
        }

        next.run(req).await
    }
}
