// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Scaling policies: map pool state to a signed instance delta.
//!
//! A policy only *requests* scaling; the pool applies the delta, subject to
//! its per-tick spawn rate limit, and the requested instances still take
//! simulated time to start or stop.

use crate::error::HardValidationError;
use crate::stats::PoolSnapshot;

/// Decides how many instances to add (positive) or remove (negative) given
/// the pool's current state. Returning 0 leaves the pool unchanged.
pub trait ScalingPolicy {
    fn decide(&mut self, snapshot: &PoolSnapshot) -> i64;
}

/// A constant delta, applied every tick. Mostly useful in tests and for
/// scripted scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelta(pub i64);

impl ScalingPolicy for FixedDelta {
    fn decide(&mut self, _snapshot: &PoolSnapshot) -> i64 {
        self.0
    }
}

/// Adapter turning a closure over the pool snapshot into a policy.
#[derive(Debug, Clone)]
pub struct PolicyFn<F>(F);

/// Wrap an arbitrary `FnMut(&PoolSnapshot) -> i64` as a scaling policy.
pub fn policy_fn<F>(f: F) -> PolicyFn<F>
where
    F: FnMut(&PoolSnapshot) -> i64,
{
    PolicyFn(f)
}

impl<F> ScalingPolicy for PolicyFn<F>
where
    F: FnMut(&PoolSnapshot) -> i64,
{
    fn decide(&mut self, snapshot: &PoolSnapshot) -> i64 {
        (self.0)(snapshot)
    }
}

/// Utilization-targeting policy with a symmetric dead-band.
///
/// Utilization is `processed_load / total_load_capability` (0 when nothing is
/// being processed). Inside `target ± dead_band` the policy holds steady;
/// outside it, the instance count is scaled proportionally to
/// `utilization / target`, rounded up. Scale-down is suppressed when it would
/// leave no Ready instance behind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtilizationPolicy {
    target_utilization: f64,
    dead_band: f64,
}

impl UtilizationPolicy {
    /// Create a utilization policy with validation: the target must lie in
    /// (0, 1] and the dead-band in [0, target).
    pub fn new(target_utilization: f64, dead_band: f64) -> Result<Self, HardValidationError> {
        if !target_utilization.is_finite()
            || target_utilization <= 0.0
            || target_utilization > 1.0
        {
            return Err(HardValidationError::InvalidFieldValue {
                field: "target_utilization",
                value: target_utilization.to_string(),
                reason: "target utilization must be in (0, 1]".to_string(),
            });
        }

        if !dead_band.is_finite() || dead_band < 0.0 || dead_band >= target_utilization {
            return Err(HardValidationError::InvalidFieldValue {
                field: "dead_band",
                value: dead_band.to_string(),
                reason: "dead-band must be in [0, target_utilization)".to_string(),
            });
        }

        Ok(Self {
            target_utilization,
            dead_band,
        })
    }

    /// The utilization the policy steers towards.
    pub fn target_utilization(&self) -> f64 {
        self.target_utilization
    }

    /// Half-width of the no-action band around the target.
    pub fn dead_band(&self) -> f64 {
        self.dead_band
    }
}

impl Default for UtilizationPolicy {
    /// Target 50% utilization, act only outside 30%-70%.
    fn default() -> Self {
        Self {
            target_utilization: 0.5,
            dead_band: 0.2,
        }
    }
}

impl ScalingPolicy for UtilizationPolicy {
    fn decide(&mut self, snapshot: &PoolSnapshot) -> i64 {
        let utilization = if snapshot.processed_load == 0.0 {
            0.0
        } else {
            snapshot.processed_load / snapshot.total_load_capability
        };

        let lower = self.target_utilization - self.dead_band;
        let upper = self.target_utilization + self.dead_band;
        if utilization > lower && utilization < upper {
            return 0;
        }

        let scaling_factor = utilization / self.target_utilization;
        let ready = snapshot.counts.ready;
        let starting = snapshot.counts.starting;
        let terminating = snapshot.counts.terminating;

        if scaling_factor > 1.0 {
            let up = ((ready + starting) as f64 * scaling_factor).ceil() as i64;
            tracing::debug!(utilization, delta = up, "scaling up");
            return up;
        }

        let down =
            ((ready as f64 - terminating as f64) * scaling_factor).ceil() as i64;
        if ready as i64 - down > 0 {
            tracing::debug!(utilization, delta = -down, "scaling down");
            return -down;
        }

        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StateCounts;
    use crate::types::Timestamp;

    fn snapshot(
        processed: f64,
        capability: f64,
        starting: usize,
        ready: usize,
        terminating: usize,
    ) -> PoolSnapshot {
        PoolSnapshot {
            current_time: Timestamp::ZERO,
            applied_load: processed,
            experienced_load: processed,
            processed_load: processed,
            total_load_capability: capability,
            counts: StateCounts {
                starting,
                ready,
                terminating,
                off: 0,
            },
        }
    }

    #[test]
    fn test_validation() {
        assert!(UtilizationPolicy::new(0.5, 0.2).is_ok());
        assert!(UtilizationPolicy::new(1.0, 0.0).is_ok());
        assert!(UtilizationPolicy::new(0.0, 0.0).is_err());
        assert!(UtilizationPolicy::new(1.5, 0.2).is_err());
        assert!(UtilizationPolicy::new(0.5, 0.5).is_err());
        assert!(UtilizationPolicy::new(0.5, -0.1).is_err());
        assert!(UtilizationPolicy::new(f64::NAN, 0.2).is_err());
    }

    #[test]
    fn test_inside_dead_band_holds_steady() {
        let mut policy = UtilizationPolicy::default();

        // Utilization 0.5, exactly on target.
        assert_eq!(policy.decide(&snapshot(1.0, 2.0, 0, 2, 0)), 0);
        // Utilization 0.65, inside the 0.3-0.7 band.
        assert_eq!(policy.decide(&snapshot(1.3, 2.0, 0, 2, 0)), 0);
        // Utilization 0.35, inside the band.
        assert_eq!(policy.decide(&snapshot(0.7, 2.0, 0, 2, 0)), 0);
    }

    #[test]
    fn test_scale_up_above_band() {
        let mut policy = UtilizationPolicy::default();

        // Fully saturated: factor 2, two instances counted (1 ready + 1
        // starting) -> request 4.
        assert_eq!(policy.decide(&snapshot(2.0, 2.0, 1, 1, 0)), 4);

        // Utilization 0.8, factor 1.6, 2 ready -> ceil(3.2) = 4.
        assert_eq!(policy.decide(&snapshot(1.6, 2.0, 0, 2, 0)), 4);
    }

    #[test]
    fn test_scale_down_below_band() {
        let mut policy = UtilizationPolicy::default();

        // Utilization 0.2, factor 0.4, 5 ready -> ceil(2.0) = 2 removed.
        assert_eq!(policy.decide(&snapshot(1.0, 5.0, 0, 5, 0)), -2);

        // Terminating instances are discounted from the scale-down base:
        // factor 0.4, (5 ready - 2 terminating) -> ceil(1.2) = 2 removed.
        assert_eq!(policy.decide(&snapshot(1.0, 5.0, 0, 5, 2)), -2);
    }

    #[test]
    fn test_scale_down_keeps_at_least_one_ready() {
        let mut policy = UtilizationPolicy::default();

        // Utilization 0.25 on a single instance: removing ceil(0.5) = 1
        // would leave nothing Ready, so hold steady instead.
        assert_eq!(policy.decide(&snapshot(0.25, 1.0, 0, 1, 0)), 0);
    }

    #[test]
    fn test_zero_processed_load_means_zero_utilization() {
        let mut policy = UtilizationPolicy::default();

        // No capability at all: no division, no action.
        assert_eq!(policy.decide(&snapshot(0.0, 0.0, 0, 0, 0)), 0);
        // Capability but nothing processed: factor 0, scale-down request of
        // 0 is suppressed.
        assert_eq!(policy.decide(&snapshot(0.0, 2.0, 0, 2, 0)), 0);
    }

    #[test]
    fn test_fixed_delta() {
        let mut policy = FixedDelta(-3);
        assert_eq!(policy.decide(&snapshot(1.0, 2.0, 0, 2, 0)), -3);
        assert_eq!(policy.decide(&snapshot(0.0, 0.0, 0, 0, 0)), -3);
    }

    #[test]
    fn test_policy_fn_closure() {
        let mut calls = 0;
        {
            let mut policy = policy_fn(|snapshot: &PoolSnapshot| {
                calls += 1;
                snapshot.counts.ready as i64
            });
            assert_eq!(policy.decide(&snapshot(1.0, 2.0, 0, 2, 0)), 2);
            assert_eq!(policy.decide(&snapshot(1.0, 2.0, 0, 7, 0)), 7);
        }
        assert_eq!(calls, 2);
    }
}
