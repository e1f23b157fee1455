// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! A single service instance moving through its lifecycle.
//!
//! Instances are created by the pool, advanced once per simulated tick, and
//! removed after reaching Off. All transition times are scheduled up front
//! from the scaling time options; `advance` only realizes them once the
//! simulated clock catches up.

use rand::Rng;

use crate::error::LifecycleError;
use crate::state::InstanceState;
use crate::timing::ScalingTimeOptions;
use crate::types::{InstanceId, Timestamp};

/// One unit of service capacity tracked through Starting → Ready →
/// Terminating → Off.
///
/// Timestamp invariant: whenever defined, `started_at ≤ ready_at ≤
/// terminating_at ≤ off_at`. A Starting instance carries its *scheduled*
/// `ready_at`; if it is terminated before becoming Ready the schedule is
/// cleared, since that transition never happens.
#[derive(Debug, Clone)]
pub struct ServiceInstance {
    id: InstanceId,
    load_capability: f64,
    state: InstanceState,
    started_at: Timestamp,
    ready_at: Option<Timestamp>,
    terminating_at: Option<Timestamp>,
    off_at: Option<Timestamp>,
}

impl ServiceInstance {
    /// Spawn a new instance in the Starting state. Its ready time is drawn
    /// from the scale-up options, anchored to `created_at`.
    pub fn spawn<R: Rng + ?Sized>(
        id: InstanceId,
        created_at: Timestamp,
        options: &ScalingTimeOptions,
        load_capability: f64,
        rng: &mut R,
    ) -> Self {
        let ready_at = options.sample_after(created_at, rng);

        tracing::debug!(
            instance = %id,
            started_at = created_at.as_secs(),
            ready_at = ready_at.as_secs(),
            "spawning instance"
        );

        Self {
            id,
            load_capability,
            state: InstanceState::Starting,
            started_at: created_at,
            ready_at: Some(ready_at),
            terminating_at: None,
            off_at: None,
        }
    }

    /// Create a pre-warmed instance: Ready from the outset, with no startup
    /// delay. Both lifecycle timestamps equal the creation time.
    pub fn pre_ready(id: InstanceId, created_at: Timestamp, load_capability: f64) -> Self {
        Self {
            id,
            load_capability,
            state: InstanceState::Ready,
            started_at: created_at,
            ready_at: Some(created_at),
            terminating_at: None,
            off_at: None,
        }
    }

    /// Realize any scheduled transition whose time has come.
    ///
    /// Starting → Ready once `now ≥ ready_at`; Terminating → Off once
    /// `now ≥ off_at`. No-op in Ready and Off. Idempotent under repeated
    /// calls with the same time; the caller is expected to supply a
    /// monotonically non-decreasing clock.
    pub fn advance(&mut self, now: Timestamp) {
        match self.state {
            InstanceState::Starting => {
                if self.ready_at.is_some_and(|ready_at| now >= ready_at) {
                    self.transition(InstanceState::Ready);
                }
            }
            InstanceState::Terminating => {
                if self.off_at.is_some_and(|off_at| now >= off_at) {
                    self.transition(InstanceState::Off);
                }
            }
            InstanceState::Ready | InstanceState::Off => {}
        }
    }

    /// Begin termination of a Starting or Ready instance.
    ///
    /// Sets `terminating_at = now` and schedules `off_at` from the
    /// scale-down options. Calling this on an instance that is already
    /// Terminating or Off is a caller error and is reported as such.
    pub fn begin_termination<R: Rng + ?Sized>(
        &mut self,
        now: Timestamp,
        options: &ScalingTimeOptions,
        rng: &mut R,
    ) -> Result<(), LifecycleError> {
        match self.state {
            InstanceState::Starting | InstanceState::Ready => {
                if self.state == InstanceState::Starting {
                    // The scheduled ready time never realizes.
                    self.ready_at = None;
                }
                self.terminating_at = Some(now);
                self.off_at = Some(options.sample_after(now, rng));
                self.transition(InstanceState::Terminating);
                Ok(())
            }
            InstanceState::Terminating | InstanceState::Off => {
                Err(LifecycleError::InvalidTransition {
                    instance: self.id,
                    from: self.state.name(),
                    to: InstanceState::Terminating.name(),
                })
            }
        }
    }

    fn transition(&mut self, target: InstanceState) {
        debug_assert!(self.state.can_transition_to(target));

        tracing::debug!(
            instance = %self.id,
            from = self.state.name(),
            to = target.name(),
            "lifecycle transition"
        );

        self.state = target;
    }

    /// Get the instance ID.
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Get the current lifecycle state.
    pub fn state(&self) -> InstanceState {
        self.state
    }

    /// Maximum load this instance absorbs once Ready.
    pub fn load_capability(&self) -> f64 {
        self.load_capability
    }

    /// When the instance was created.
    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    /// Scheduled or realized ready time, if the instance ever becomes Ready.
    pub fn ready_at(&self) -> Option<Timestamp> {
        self.ready_at
    }

    /// When termination began, if it has.
    pub fn terminating_at(&self) -> Option<Timestamp> {
        self.terminating_at
    }

    /// Scheduled or realized off time, if termination has begun.
    pub fn off_at(&self) -> Option<Timestamp> {
        self.off_at
    }
}
