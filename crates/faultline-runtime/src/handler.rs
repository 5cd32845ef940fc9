//! HTTP request handler
//!
//! The dispatcher at the end of the pipeline: resolves control paths,
//! the catalog, the metrics snapshot, and registered mock endpoints.

use crate::control::ControlApi;
use bytes::Bytes;
use faultline_core::middleware::HandlerFuture;
use faultline_core::response::responses;
use faultline_core::{Body, EndpointKey, Error, Middleware, Next, Result};
use faultline_metrics::{MetricsCollector, PrometheusExporter};
use faultline_registry::{EndpointRegistry, TargetClient};
use http::{header, Method, Request, Response};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Per-request entry point: runs the middleware pipeline, then
/// dispatches to the matched endpoint or built-in handler.
#[derive(Clone)]
pub struct RequestHandler {
    registry: Arc<EndpointRegistry>,
    client: TargetClient,
    control: ControlApi,
    collector: MetricsCollector,
    pipeline: Arc<[Arc<dyn Middleware>]>,
    api_prefix: String,
    request_count: Arc<AtomicUsize>,
}

impl std::fmt::Debug for RequestHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHandler")
            .field("endpoints", &self.registry.len())
            .field("pipeline_len", &self.pipeline.len())
            .field("api_prefix", &self.api_prefix)
            .finish()
    }
}

impl RequestHandler {
    /// Create a handler from assembled components.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<EndpointRegistry>,
        client: TargetClient,
        control: ControlApi,
        collector: MetricsCollector,
        pipeline: Arc<[Arc<dyn Middleware>]>,
        api_prefix: impl Into<String>,
        request_count: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            registry,
            client,
            control,
            collector,
            pipeline,
            api_prefix: api_prefix.into(),
            request_count,
        }
    }

    /// Number of requests currently in flight.
    pub fn in_flight(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Handle an incoming request from Hyper.
    pub async fn handle(&self, req: Request<Incoming>) -> Result<Response<Body>> {
        let (parts, body) = req.into_parts();
        let body_bytes = body
            .collect()
            .await
            .map_err(|e| Error::InvalidRequest(format!("failed to read request body: {e}")))?
            .to_bytes();
        let req = Request::from_parts(parts, Full::new(body_bytes));

        self.handle_request(req).await
    }

    /// Run the pipeline and dispatch one request.
    pub async fn handle_request(&self, req: Request<Body>) -> Result<Response<Body>> {
        self.request_count.fetch_add(1, Ordering::Relaxed);

        debug!(
            method = %req.method(),
            path = %req.uri().path(),
            "Handling request"
        );

        let dispatcher = self.clone();
        let terminal: faultline_core::Handler = Arc::new(move |req: Request<Body>| {
            let dispatcher = dispatcher.clone();
            Box::pin(async move { dispatcher.dispatch(req).await }) as HandlerFuture
        });

        let result = Next::new(Arc::clone(&self.pipeline), terminal).run(req).await;

        self.request_count.fetch_sub(1, Ordering::Relaxed);

        result
    }

    /// Terminal handler behind the pipeline. Expected failures (unknown
    /// route, bad parameters, missing specs) become plain-text error
    /// responses here so that logging and metrics see their real status.
    async fn dispatch(&self, req: Request<Body>) -> Result<Response<Body>> {
        match self.route(&req).await {
            Ok(response) => Ok(response),
            Err(e) => {
                debug!(error = %e, "Request dispatch error");
                faultline_core::ResponseBuilder::new(e.to_status_code()).text(e.to_string())
            }
        }
    }

    async fn route(&self, req: &Request<Body>) -> Result<Response<Body>> {
        let method = req.method();
        let path = req.uri().path();
        let query = req.uri().query();

        if path == "/" {
            return if *method == Method::GET {
                self.handle_catalog()
            } else {
                responses::method_not_allowed()
            };
        }

        if path == "/metrics" {
            return if *method == Method::GET {
                self.handle_metrics()
            } else {
                responses::method_not_allowed()
            };
        }

        if path == "/delay" || path.starts_with("/delay/") {
            return self.control.handle_delay(method, path, query);
        }

        if path == "/error" {
            return self.control.handle_error(method, query);
        }

        if let Some(key) = self.endpoint_key(method, path) {
            if let Some(endpoint) = self.registry.lookup(&key) {
                return endpoint.respond(&self.client).await;
            }
            return Err(Error::EndpointNotFound(key.to_string()));
        }

        Err(Error::EndpointNotFound(format!("{method} {path}")))
    }

    /// Map a request path under the API prefix to its registry key.
    fn endpoint_key(&self, method: &Method, path: &str) -> Option<EndpointKey> {
        let route = path.strip_prefix(&self.api_prefix)?;

        if route.is_empty() || !route.starts_with('/') {
            return None;
        }

        Some(EndpointKey::new(method.clone(), route))
    }

    /// `GET /`: machine-readable listing of all registered endpoints.
    fn handle_catalog(&self) -> Result<Response<Body>> {
        responses::ok().json(&self.registry.catalog())
    }

    /// `GET /metrics`: Prometheus text-format snapshot.
    fn handle_metrics(&self) -> Result<Response<Body>> {
        let body = PrometheusExporter::export(&self.collector);

        Ok(Response::builder()
            .status(http::StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/plain; version=0.0.4")
            .body(Full::new(Bytes::from(body)))?)
    }
}
