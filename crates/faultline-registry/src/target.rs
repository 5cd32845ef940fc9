//! Downstream targets and the outbound requester

use faultline_core::{Body, Bytes, Error, Result};
use http::{Method, Request};
use http_body_util::BodyExt;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::time::Duration;
use url::Url;

/// One downstream call descriptor of a chaining endpoint.
#[derive(Debug, Clone)]
pub struct Target {
    /// HTTP method for the outbound call
    pub method: Method,
    /// Absolute URL of the downstream endpoint
    pub url: Url,
}

impl Target {
    /// Create a target, rejecting missing or non-absolute URLs.
    pub fn new(method: &str, url: &str) -> Result<Self> {
        if method.is_empty() {
            return Err(Error::Config(
                "target method not specified".to_string(),
            ));
        }

        let method = method
            .parse::<Method>()
            .map_err(|_| Error::Config(format!("invalid target method: {method}")))?;

        if url.is_empty() {
            return Err(Error::Config("target url not specified".to_string()));
        }

        let url = Url::parse(url).map_err(|e| Error::Config(format!("invalid target url: {e}")))?;

        if !url.has_host() {
            return Err(Error::Config(format!("target url is not absolute: {url}")));
        }

        Ok(Self { method, url })
    }
}

/// Outcome of one target call, normalized to a text line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOutcome {
    /// `"HTTP <status>: <trimmed body>"` on success,
    /// `"error: <message>"` on failure
    pub line: String,
    /// Whether the call and the body read both succeeded
    pub ok: bool,
}

impl TargetOutcome {
    fn success(line: String) -> Self {
        Self { line, ok: true }
    }

    fn failure(message: impl std::fmt::Display) -> Self {
        Self {
            line: format!("error: {message}"),
            ok: false,
        }
    }
}

/// HTTP client performing outbound target calls.
///
/// Calls carry a per-call timeout; dropping the future of the inbound
/// request that spawned them cancels them.
#[derive(Debug, Clone)]
pub struct TargetClient {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl TargetClient {
    /// Create a client with the given per-call timeout.
    pub fn new(timeout: Duration) -> Self {
        let connector = HttpConnector::new();
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self { client, timeout }
    }

    /// Configured per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform one call to a target and normalize the result.
    pub async fn call(&self, target: &Target) -> TargetOutcome {
        tracing::debug!(
            method = %target.method,
            url = %target.url,
            "Requesting target endpoint"
        );

        let req = match Request::builder()
            .method(target.method.clone())
            .uri(target.url.as_str())
            .body(Body::new(Bytes::new()))
        {
            Ok(req) => req,
            Err(e) => return TargetOutcome::failure(e),
        };

        let response = match tokio::time::timeout(self.timeout, self.client.request(req)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return TargetOutcome::failure(e),
            Err(_) => return TargetOutcome::failure("target request timed out"),
        };

        let status = response.status();

        match response.into_body().collect().await {
            Ok(collected) => {
                let body = String::from_utf8_lossy(&collected.to_bytes()).into_owned();
                TargetOutcome::success(format!("HTTP {status}: {}", body.trim()))
            }
            Err(e) => TargetOutcome::failure(e),
        }
    }
}
