// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Randomized transition durations for scale-up and scale-down.
//!
//! Start and stop times are drawn from a normal distribution clamped at zero;
//! a negative delay has no physical meaning for a transition. The RNG is
//! always supplied by the caller so runs are reproducible under a fixed seed.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::HardValidationError;
use crate::types::Timestamp;

/// How long a scaling transition takes: a normal distribution over seconds,
/// described by its mean and standard deviation and clamped at zero.
///
/// The pool holds two independent values of this type, one for scale-up and
/// one for scale-down.
#[derive(Debug, Clone, Copy)]
pub struct ScalingTimeOptions {
    mean_secs: f64,
    std_dev_secs: f64,
    dist: Normal<f64>,
}

impl ScalingTimeOptions {
    /// Create scaling time options with validation.
    /// The mean must be finite and non-negative; the standard deviation must
    /// be finite and non-negative (zero makes sampling deterministic).
    pub fn new(mean_secs: f64, std_dev_secs: f64) -> Result<Self, HardValidationError> {
        if !mean_secs.is_finite() || mean_secs < 0.0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "mean_secs",
                value: mean_secs.to_string(),
                reason: "mean transition time must be finite and non-negative".to_string(),
            });
        }

        let dist = Normal::new(mean_secs, std_dev_secs).map_err(|_| {
            HardValidationError::InvalidFieldValue {
                field: "std_dev_secs",
                value: std_dev_secs.to_string(),
                reason: "standard deviation must be finite and non-negative".to_string(),
            }
        })?;

        Ok(Self {
            mean_secs,
            std_dev_secs,
            dist,
        })
    }

    /// Mean transition time in seconds.
    pub fn mean_secs(&self) -> f64 {
        self.mean_secs
    }

    /// Standard deviation of the transition time in seconds.
    pub fn std_dev_secs(&self) -> f64 {
        self.std_dev_secs
    }

    /// Draw a transition duration in seconds, clamped to a minimum of zero.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.dist.sample(rng).max(0.0)
    }

    /// Draw a transition duration and anchor it to `start`: returns the
    /// simulated time at which the transition completes.
    pub fn sample_after<R: Rng + ?Sized>(&self, start: Timestamp, rng: &mut R) -> Timestamp {
        start.offset(self.sample(rng))
    }
}
