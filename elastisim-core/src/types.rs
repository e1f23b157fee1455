// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for simulated-time values and instance identity.
//!
//! Following the "Newtype" pattern in Rust to ensure valid state by
//! construction. Simulated time is a plain offset in seconds, not wall-clock
//! time: the engine never reads a real clock.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HardValidationError;

/// A point in simulated time, in seconds.
///
/// Finite by construction. Ordering uses IEEE total ordering so sorts over
/// timestamps are fully deterministic.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(f64);

impl Timestamp {
    /// The simulation epoch.
    pub const ZERO: Timestamp = Timestamp(0.0);

    /// Create a timestamp from seconds, rejecting NaN and infinities.
    pub fn from_secs(secs: f64) -> Result<Self, HardValidationError> {
        if !secs.is_finite() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "timestamp",
                value: secs.to_string(),
                reason: "timestamp must be a finite number of seconds".to_string(),
            });
        }
        Ok(Self(secs))
    }

    /// Get the timestamp as seconds since the simulation epoch.
    pub fn as_secs(self) -> f64 {
        self.0
    }

    /// A new timestamp `secs` seconds after this one.
    pub fn offset(self, secs: f64) -> Timestamp {
        Timestamp(self.0 + secs)
    }

    /// Total ordering over timestamps (IEEE totalOrder on the inner value).
    pub fn total_cmp(&self, other: &Timestamp) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Stable identifier for a service instance.
///
/// Assigned by the pool from a monotonic counter; never reused within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Create an instance ID from its raw counter value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw counter value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance-{}", self.0)
    }
}
