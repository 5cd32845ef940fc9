//! # Faultline Metrics
//!
//! Request latency metrics keyed by (method, path, status), recorded by
//! the metrics middleware and exported in the Prometheus text format
//! from `GET /metrics`.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod collector;
pub mod prometheus;

pub use collector::{MetricsCollector, SeriesKey};
pub use prometheus::PrometheusExporter;
