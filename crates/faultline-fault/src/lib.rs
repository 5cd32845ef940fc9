//! # Faultline Fault Model
//!
//! Pure probability/duration logic shared by delay and error injection,
//! plus the concurrency-safe per-endpoint spec stores mutated by the
//! control API and read on every request.
//!
//! A spec fires when a fresh uniform draw `p ∈ [0, 1)` satisfies
//! `p > 1 - probability`: probability 1.0 always fires, 0.0 never does,
//! and intermediate values scale linearly. Draws are independent per
//! request and per concern; nothing is shared beyond the process RNG.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod delay;
pub mod error;

pub use delay::{DelaySpec, DelayStore};
pub use error::{ErrorSpec, ErrorStore, DEFAULT_ERROR_STATUS};

use rand::Rng;

/// Default trigger probability for both delay and error specs: a spec
/// installed without an explicit probability always applies.
pub const DEFAULT_PROBABILITY: f64 = 1.0;

/// Draw once and decide whether a spec with the given probability fires.
pub(crate) fn fires(probability: f64) -> bool {
    rand::thread_rng().gen::<f64>() > 1.0 - probability
}

/// Validate a trigger probability.
pub(crate) fn check_probability(probability: f64) -> faultline_core::Result<()> {
    if !(0.0..=1.0).contains(&probability) || probability.is_nan() {
        return Err(faultline_core::Error::InvalidParameter(format!(
            "probability must be within [0, 1], got {probability}"
        )));
    }
    Ok(())
}
