//! HTTP server implementation

use crate::control::ControlApi;
use crate::handler::RequestHandler;
use crate::shutdown::ShutdownSignal;
use faultline_config::Config;
use faultline_core::{EndpointKey, Error, IgnoreSet, Result};
use faultline_fault::{DelayStore, ErrorStore};
use faultline_metrics::MetricsCollector;
use faultline_middleware::PipelineBuilder;
use faultline_registry::{Endpoint, EndpointRegistry, Target, TargetClient};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// The Faultline HTTP server: the assembled pipeline, dispatcher, and
/// listener lifecycle.
#[derive(Debug)]
pub struct Server {
    config: Config,
    handler: RequestHandler,
    shutdown: ShutdownSignal,
    request_count: Arc<AtomicUsize>,
}

impl Server {
    /// Create a new server builder
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Get listen address
    pub fn listen_addr(&self) -> SocketAddr {
        self.config.server.listen
    }

    /// Get shutdown signal
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// The per-request handler (pipeline + dispatcher).
    pub fn request_handler(&self) -> RequestHandler {
        self.handler.clone()
    }

    /// Run the server until shutdown is triggered, then drain in-flight
    /// requests up to the configured timeout.
    pub async fn run(&self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_addr())
            .await
            .map_err(|e| {
                Error::Config(format!("failed to bind to {}: {e}", self.listen_addr()))
            })?;

        tracing::info!(listen = %self.listen_addr(), "Server listening");

        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            tracing::trace!("Accepted connection from {addr}");

                            let handler = self.handler.clone();

                            tokio::spawn(async move {
                                let service = hyper::service::service_fn(move |req| {
                                    let handler = handler.clone();
                                    async move {
                                        handler.handle(req).await.or_else(|e| {
                                            tracing::error!("Request handler error: {e}");
                                            http::Response::builder()
                                                .status(e.to_status_code())
                                                .body(http_body_util::Full::new(
                                                    bytes::Bytes::from(format!("Error: {e}")),
                                                ))
                                        })
                                    }
                                });

                                let io = hyper_util::rt::TokioIo::new(stream);
                                if let Err(e) = hyper::server::conn::http1::Builder::new()
                                    .serve_connection(io, service)
                                    .await
                                {
                                    tracing::debug!("Connection error: {e}");
                                }
                            });
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {e}");
                        }
                    }
                }

                _ = shutdown_rx.recv() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.drain().await;

        Ok(())
    }

    /// Wait for in-flight requests to finish, bounded by the configured
    /// shutdown timeout.
    async fn drain(&self) {
        let timeout = self.config.server.shutdown_timeout;
        let start = std::time::Instant::now();

        tracing::info!(
            timeout_secs = timeout.as_secs(),
            "Waiting for in-flight requests to complete"
        );

        loop {
            let active = self.request_count.load(Ordering::Relaxed);

            if active == 0 {
                tracing::info!("All requests completed, shutting down cleanly");
                break;
            }

            if start.elapsed() >= timeout {
                tracing::warn!(
                    active_requests = active,
                    "Shutdown timeout reached, forcing shutdown"
                );
                break;
            }

            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        tracing::info!(
            shutdown_duration_ms = start.elapsed().as_millis() as u64,
            "Server stopped"
        );
    }
}

/// Server builder
#[derive(Debug, Default)]
pub struct ServerBuilder {
    config: Option<Config>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self { config: None }
    }

    /// Set configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the server
    pub fn build(self) -> Result<Server> {
        let config = self
            .config
            .ok_or_else(|| Error::Config("config is required".to_string()))?;

        // Register endpoints
        let registry = Arc::new(EndpointRegistry::new());

        for e in &config.endpoints {
            let method = e
                .method
                .parse()
                .map_err(|_| Error::Config(format!("invalid HTTP method: {}", e.method)))?;
            let key = EndpointKey::new(method, e.route.clone());

            let endpoint = match &e.targets {
                Some(targets) => {
                    let targets = targets
                        .iter()
                        .map(|t| Target::new(&t.method, &t.url))
                        .collect::<Result<Vec<_>>>()?;
                    Endpoint::chaining(key, targets)?
                }
                None => Endpoint::fixed(
                    key,
                    e.response_status.unwrap_or(0),
                    e.response_body.clone().unwrap_or_default(),
                )?,
            };

            registry.register(endpoint);
        }

        // Shared fault stores, mutated by the control API and read on
        // every request.
        let delay_store = Arc::new(DelayStore::new(config.faults.base_jitter));
        let error_store = Arc::new(ErrorStore::new());

        let collector = MetricsCollector::new(config.metrics.latency_histogram_buckets.clone());

        // One ignore set per pipeline element, all built from the same
        // configured entries.
        let ignore = IgnoreSet::new(config.ignore.iter().cloned());
        let api_prefix = config.server.api_prefix.clone();

        let mut pipeline = PipelineBuilder::new()
            .with_logging(ignore.clone())
            .with_metrics(collector.clone(), ignore.clone());

        if config.tracing.enabled {
            pipeline = pipeline.with_tracing(ignore.clone());
        }

        let pipeline = pipeline
            .with_delay(
                Arc::clone(&delay_store),
                ignore.clone(),
                api_prefix.clone(),
                config.faults.jitter_ignored_paths,
            )
            .with_error(Arc::clone(&error_store), ignore, api_prefix.clone())
            .build();

        let client = TargetClient::new(config.server.target_timeout);
        let control = ControlApi::new(delay_store, error_store);
        let request_count = Arc::new(AtomicUsize::new(0));

        let handler = RequestHandler::new(
            Arc::clone(&registry),
            client,
            control,
            collector,
            pipeline,
            api_prefix,
            Arc::clone(&request_count),
        );

        tracing::info!(
            endpoints = registry.len(),
            tracing_enabled = config.tracing.enabled,
            "Server components initialized"
        );

        Ok(Server {
            config,
            handler,
            shutdown: ShutdownSignal::new(),
            request_count,
        })
    }
}
