//! Error injection middleware

use crate::route_key;
use async_trait::async_trait;
use faultline_core::{Body, IgnoreSet, Middleware, Next, ResponseBuilder, Result};
use faultline_fault::ErrorStore;
use http::{Request, Response};
use std::sync::Arc;

/// Short-circuits requests with a synthetic error when an error spec is
/// installed for the endpoint and its probability fires. Nothing after
/// this element runs for a short-circuited request; the injected status
/// and message are written directly.
///
/// An injected error is a successfully executed feature, not a failure:
/// it flows back through logging and metrics like any served response.
#[derive(Debug, Clone)]
pub struct ErrorMiddleware {
    store: Arc<ErrorStore>,
    ignore: IgnoreSet,
    api_prefix: String,
}

impl ErrorMiddleware {
    /// Create the element.
    pub fn new(store: Arc<ErrorStore>, ignore: IgnoreSet, api_prefix: impl Into<String>) -> Self {
        Self {
            store,
            ignore,
            api_prefix: api_prefix.into(),
        }
    }
}

#[async_trait]
impl Middleware for ErrorMiddleware {
    async fn handle(&self, req: Request<Body>, next: Next) -> Result<Response<Body>> {
        let path = req.uri().path();

        if !self.ignore.matches(path) {
            if let Some(key) = route_key(&self.api_prefix, req.method(), path) {
                if let Some(spec) = self.store.get(&key) {
                    if spec.fires() {
                        tracing::debug!(
                            key = %key,
                            status = spec.status,
                            "Injecting error"
                        );
                        return ResponseBuilder::new(spec.status_code()).text(spec.message);
                    }
                }
            }
        }

        next.run(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use faultline_core::{EndpointKey, Handler};
    use faultline_fault::ErrorSpec;
    use http::{Method, StatusCode};
    use http_body_util::{BodyExt, Full};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_terminal(calls: Arc<AtomicUsize>) -> Handler {
        Arc::new(move |_req| {
            let calls = Arc::clone(&calls);
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(http::Response::builder()
                    .status(StatusCode::OK)
                    .body(Full::new(Bytes::from_static(b"real")))
                    .unwrap())
            }) as faultline_core::middleware::HandlerFuture
        })
    }

    fn request(path: &str) -> Request<Body> {
        Request::builder()
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn pipeline(mw: ErrorMiddleware, calls: Arc<AtomicUsize>) -> Next {
        let stack: Arc<[Arc<dyn Middleware>]> = Arc::new([Arc::new(mw) as _]);
        Next::new(stack, counting_terminal(calls))
    }

    async fn body_string(resp: Response<Body>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_certain_error_short_circuits() {
        let store = Arc::new(ErrorStore::new());
        store.set(
            EndpointKey::new(Method::GET, "/a"),
            ErrorSpec::new(503, "backend down", 1.0).unwrap(),
        );

        let calls = Arc::new(AtomicUsize::new(0));
        let mw = ErrorMiddleware::new(Arc::clone(&store), IgnoreSet::default(), "/api");

        let resp = pipeline(mw, Arc::clone(&calls))
            .run(request("/api/a"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_string(resp).await, "backend down");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_probability_passes_through() {
        let store = Arc::new(ErrorStore::new());
        store.set(
            EndpointKey::new(Method::GET, "/a"),
            ErrorSpec::new(503, "never", 0.0).unwrap(),
        );

        let calls = Arc::new(AtomicUsize::new(0));
        let mw = ErrorMiddleware::new(Arc::clone(&store), IgnoreSet::default(), "/api");

        let resp = pipeline(mw, Arc::clone(&calls))
            .run(request("/api/a"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_absent_spec_passes_through() {
        let store = Arc::new(ErrorStore::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let mw = ErrorMiddleware::new(Arc::clone(&store), IgnoreSet::default(), "/api");

        let resp = pipeline(mw, Arc::clone(&calls))
            .run(request("/api/a"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ignored_path_never_injected() {
        let store = Arc::new(ErrorStore::new());
        store.set(
            EndpointKey::new(Method::GET, "/a"),
            ErrorSpec::new(500, "boom", 1.0).unwrap(),
        );

        let calls = Arc::new(AtomicUsize::new(0));
        let mw = ErrorMiddleware::new(Arc::clone(&store), IgnoreSet::new(["/api"]), "/api");

        let resp = pipeline(mw, Arc::clone(&calls))
            .run(request("/api/a"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
