//! # Faultline Core
//!
//! Core types, traits, and error handling for the Faultline fault-injection
//! server.
//!
//! This crate provides the foundational abstractions used throughout the
//! server:
//! - The [`Middleware`] trait and [`Next`] chain
//! - Error types
//! - Endpoint keys
//! - The ignore-path matcher exempting paths from middleware side effects

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod error;
pub mod ignore;
pub mod key;
pub mod middleware;
pub mod response;

pub use error::{Error, Result};
pub use ignore::IgnoreSet;
pub use key::EndpointKey;
pub use middleware::{Handler, Middleware, Next};
pub use response::ResponseBuilder;

// Re-export commonly used HTTP types
pub use bytes::Bytes;
pub use http::{Method, Request, Response, StatusCode};

/// Body type used for all requests and responses inside the pipeline.
pub type Body = http_body_util::Full<Bytes>;

/// Name of the version header attached to every mock endpoint response.
pub const VERSION_HEADER: &str = "x-faultline-version";
