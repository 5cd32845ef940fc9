//! Delay injection

use crate::{check_probability, fires, DEFAULT_PROBABILITY};
use dashmap::DashMap;
use faultline_core::{EndpointKey, Result};
use parking_lot::RwLock;
use rand::Rng;
use std::fmt;
use std::time::Duration;

/// Per-endpoint delay configuration, installed via the control API.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelaySpec {
    /// Extra latency injected when the spec fires
    pub duration: Duration,
    /// Trigger probability in [0, 1]
    pub probability: f64,
}

impl DelaySpec {
    /// Create a spec, rejecting probabilities outside [0, 1].
    pub fn new(duration: Duration, probability: f64) -> Result<Self> {
        check_probability(probability)?;

        Ok(Self {
            duration,
            probability,
        })
    }

    /// Decide, with a fresh draw, whether this spec fires for the
    /// current request.
    pub fn fires(&self) -> bool {
        fires(self.probability)
    }
}

impl fmt::Display for DelaySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (probability: {:.1})",
            humantime::format_duration(self.duration),
            self.probability
        )
    }
}

/// Shared store of delay specs, keyed by endpoint, plus the server-wide
/// base jitter bound.
///
/// Mutated by the control API, read by the delay middleware on every
/// request. Reads observe either the old or the new spec, never a
/// partial write; concurrent installs are last-write-wins.
#[derive(Debug)]
pub struct DelayStore {
    base: RwLock<Duration>,
    specs: DashMap<EndpointKey, DelaySpec>,
}

impl DelayStore {
    /// Create a store with the given base jitter bound.
    pub fn new(base: Duration) -> Self {
        Self {
            base: RwLock::new(base),
            specs: DashMap::new(),
        }
    }

    /// Current base jitter bound.
    pub fn base(&self) -> Duration {
        *self.base.read()
    }

    /// Replace the base jitter bound.
    pub fn set_base(&self, base: Duration) {
        *self.base.write() = base;
    }

    /// Install or overwrite the spec for an endpoint.
    pub fn set(&self, key: EndpointKey, spec: DelaySpec) {
        self.specs.insert(key, spec);
    }

    /// Install with the default probability.
    pub fn set_duration(&self, key: EndpointKey, duration: Duration) -> Result<()> {
        self.set(key, DelaySpec::new(duration, DEFAULT_PROBABILITY)?);
        Ok(())
    }

    /// Current spec for an endpoint, if configured.
    pub fn get(&self, key: &EndpointKey) -> Option<DelaySpec> {
        self.specs.get(key).map(|s| *s)
    }

    /// Remove the spec for an endpoint. Returns whether one was present.
    pub fn remove(&self, key: &EndpointKey) -> bool {
        self.specs.remove(key).is_some()
    }

    /// Draw this request's base jitter sleep: uniform in
    /// `[1ms, base]`, or zero when the base is zero.
    pub fn sample_jitter(&self) -> Duration {
        let base_ms = self.base().as_millis() as u64;
        if base_ms == 0 {
            return Duration::ZERO;
        }

        Duration::from_millis(rand::thread_rng().gen_range(1..=base_ms))
    }
}

impl Default for DelayStore {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}
