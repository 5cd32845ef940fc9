//! Configuration types

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Mock endpoints
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,

    /// Fault-injection defaults
    #[serde(default)]
    pub faults: FaultConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Tracing configuration
    #[serde(default)]
    pub tracing: TracingConfig,

    /// Paths exempt from middleware side effects (still served normally).
    ///
    /// Entries match exactly or at a `/` segment boundary; `/` matches
    /// only the catalog root.
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            endpoints: Vec::new(),
            faults: FaultConfig::default(),
            metrics: MetricsConfig::default(),
            tracing: TracingConfig::default(),
            ignore: default_ignore(),
        }
    }
}

fn default_ignore() -> Vec<String> {
    vec![
        "/".to_string(),
        "/metrics".to_string(),
        "/delay".to_string(),
        "/error".to_string(),
    ]
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Prefix under which mock endpoints are served
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Graceful shutdown timeout (wait for in-flight requests)
    #[serde(default = "default_shutdown_timeout", with = "humantime_serde")]
    pub shutdown_timeout: Duration,

    /// Timeout for each outbound target call
    #[serde(default = "default_target_timeout", with = "humantime_serde")]
    pub target_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            api_prefix: default_api_prefix(),
            shutdown_timeout: default_shutdown_timeout(),
            target_timeout: default_target_timeout(),
        }
    }
}

fn default_listen() -> SocketAddr {
    "127.0.0.1:8000".parse().expect("valid default listen address")
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_target_timeout() -> Duration {
    Duration::from_secs(30)
}

/// A mock endpoint: either a static responder or a chain of downstream
/// targets. The two modes are mutually exclusive; when `targets` is
/// present any configured status/body is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointConfig {
    /// HTTP method
    pub method: String,

    /// Route path (served under the API prefix)
    pub route: String,

    /// Response status for a static endpoint
    #[serde(default)]
    pub response_status: Option<u16>,

    /// Response body for a static endpoint
    #[serde(default)]
    pub response_body: Option<String>,

    /// Downstream targets for a chaining endpoint
    #[serde(default)]
    pub targets: Option<Vec<TargetConfig>>,
}

/// One downstream call descriptor of a chaining endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetConfig {
    /// HTTP method for the outbound call
    pub method: String,

    /// Absolute URL of the downstream endpoint
    pub url: String,
}

/// Fault-injection defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaultConfig {
    /// Upper bound of the per-request base jitter sleep; zero disables it
    #[serde(default = "default_base_jitter", with = "humantime_serde")]
    pub base_jitter: Duration,

    /// Whether base jitter also applies to requests on ignored paths
    #[serde(default)]
    pub jitter_ignored_paths: bool,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            base_jitter: default_base_jitter(),
            jitter_ignored_paths: false,
        }
    }
}

fn default_base_jitter() -> Duration {
    Duration::from_millis(5)
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsConfig {
    /// Latency histogram bucket boundaries, in seconds
    #[serde(default = "default_latency_buckets")]
    pub latency_histogram_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            latency_histogram_buckets: default_latency_buckets(),
        }
    }
}

fn default_latency_buckets() -> Vec<f64> {
    vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0]
}

/// Tracing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TracingConfig {
    /// Enable the per-request trace span pipeline element
    #[serde(default)]
    pub enabled: bool,
}
