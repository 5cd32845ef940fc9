//! # Faultline Runtime
//!
//! Server runtime and lifecycle management:
//! - Pipeline and dispatcher assembly from configuration
//! - Listener lifecycle with graceful, bounded drain on shutdown
//! - The control API for live delay/error adjustment
//! - Signal handling

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod control;
pub mod handler;
pub mod server;
pub mod shutdown;

pub use control::ControlApi;
pub use handler::RequestHandler;
pub use server::{Server, ServerBuilder};
pub use shutdown::{ShutdownSignal, SignalHandler};
