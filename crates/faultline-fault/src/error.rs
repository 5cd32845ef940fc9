//! Error injection

use crate::{check_probability, fires, DEFAULT_PROBABILITY};
use dashmap::DashMap;
use faultline_core::{EndpointKey, Error, Result};
use http::StatusCode;
use std::fmt;

/// Default status code for an injected error.
pub const DEFAULT_ERROR_STATUS: u16 = 500;

/// Per-endpoint error configuration, installed via the control API.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorSpec {
    /// Injected status code, in [100, 600]
    pub status: u16,
    /// Injected response body
    pub message: String,
    /// Trigger probability in [0, 1]
    pub probability: f64,
}

impl ErrorSpec {
    /// Create a spec, rejecting status codes outside [100, 600] and
    /// probabilities outside [0, 1].
    pub fn new(status: u16, message: impl Into<String>, probability: f64) -> Result<Self> {
        if !(100..=600).contains(&status) {
            return Err(Error::InvalidParameter(format!(
                "status code must be within [100, 600], got {status}"
            )));
        }
        check_probability(probability)?;

        Ok(Self {
            status,
            message: message.into(),
            probability,
        })
    }

    /// Decide, with a fresh draw, whether this spec fires for the
    /// current request.
    pub fn fires(&self) -> bool {
        fires(self.probability)
    }

    /// The injected status as a wire-representable code. The stored
    /// upper bound 600 itself cannot appear on the wire and is clamped
    /// to 599.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status.min(599)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl fmt::Display for ErrorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} (probability: {:.1})",
            self.status, self.message, self.probability
        )
    }
}

/// Shared store of error specs, keyed by endpoint.
///
/// Same concurrency contract as
/// [`DelayStore`](crate::delay::DelayStore): atomic reads, last-write-wins
/// installs.
#[derive(Debug, Default)]
pub struct ErrorStore {
    specs: DashMap<EndpointKey, ErrorSpec>,
}

impl ErrorStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or overwrite the spec for an endpoint.
    pub fn set(&self, key: EndpointKey, spec: ErrorSpec) {
        self.specs.insert(key, spec);
    }

    /// Install with default status and probability.
    pub fn set_message(&self, key: EndpointKey, message: impl Into<String>) -> Result<()> {
        self.set(
            key,
            ErrorSpec::new(DEFAULT_ERROR_STATUS, message, DEFAULT_PROBABILITY)?,
        );
        Ok(())
    }

    /// Current spec for an endpoint, if configured.
    pub fn get(&self, key: &EndpointKey) -> Option<ErrorSpec> {
        self.specs.get(key).map(|s| s.clone())
    }

    /// Remove the spec for an endpoint. Returns whether one was present.
    pub fn remove(&self, key: &EndpointKey) -> bool {
        self.specs.remove(key).is_some()
    }
}
