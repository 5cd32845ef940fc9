//! # Faultline Middleware
//!
//! The pipeline elements layered onto every request: logging, metrics,
//! delay injection, error injection, and tracing. Each element carries
//! its own [`IgnoreSet`](faultline_core::IgnoreSet) exempting configured
//! paths from its side effects while the request is still served
//! normally.
//!
//! Ordering contract, fixed at startup by [`PipelineBuilder`]: elements
//! that measure the full request lifecycle (logging, metrics, tracing)
//! wrap the elements that alter it (delay, error), so injected latency
//! and injected errors are attributed in logs and metrics. Error
//! injection runs after delay injection: a doomed request is still
//! delayed first.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod builder;
pub mod delay;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod trace;

pub use builder::PipelineBuilder;
pub use delay::DelayMiddleware;
pub use error::ErrorMiddleware;
pub use logging::RequestLogger;
pub use metrics::MetricsMiddleware;
pub use trace::TraceMiddleware;

use faultline_core::EndpointKey;
use http::Method;

/// Derive the registry key addressed by a request path.
///
/// Mock endpoints are served under the API prefix while registry and
/// fault-store keys use the declared route, so `/api/a` resolves to the
/// key `GET /a` for prefix `/api`. Paths outside the prefix have no key.
pub(crate) fn route_key(api_prefix: &str, method: &Method, path: &str) -> Option<EndpointKey> {
    let route = path.strip_prefix(api_prefix)?;

    if route.is_empty() || !route.starts_with('/') {
        return None;
    }

    Some(EndpointKey::new(method.clone(), route))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_key_strips_prefix() {
        let key = route_key("/api", &Method::GET, "/api/a").unwrap();
        assert_eq!(key.route, "/a");
        assert_eq!(key.method, Method::GET);
    }

    #[test]
    fn test_route_key_requires_boundary() {
        assert!(route_key("/api", &Method::GET, "/apifoo").is_none());
        assert!(route_key("/api", &Method::GET, "/api").is_none());
        assert!(route_key("/api", &Method::GET, "/metrics").is_none());
    }
}
