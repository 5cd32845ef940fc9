//! # Faultline Registry
//!
//! The endpoint registry and its two endpoint modes: static responders
//! (canned status + body) and chaining endpoints that fan out to
//! downstream targets and aggregate their outcomes into one JSON array.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod endpoint;
pub mod registry;
pub mod target;

pub use endpoint::{Endpoint, EndpointInfo, EndpointKind, TargetInfo};
pub use registry::EndpointRegistry;
pub use target::{Target, TargetClient, TargetOutcome};
