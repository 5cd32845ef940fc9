//! # Faultline Config
//!
//! Configuration loading and validation for the Faultline server.
//!
//! Configuration is a single YAML, TOML, or JSON file describing the
//! listen address, the mock endpoints (static or chaining), fault
//! defaults, metric buckets, and the middleware ignore list. Validation
//! happens once at startup and is fatal; every error names the offending
//! endpoint and field.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod loader;
pub mod types;
pub mod validator;

pub use loader::{load_config, load_from_file, load_from_str, ConfigFormat};
pub use types::{
    Config, EndpointConfig, FaultConfig, MetricsConfig, ServerConfig, TargetConfig, TracingConfig,
};
pub use validator::validate_config;
