// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! The target service: a pool of instances under a scaling policy.
//!
//! The pool owns every instance and the run's RNG, and advances the whole
//! system one simulated tick at a time: realize scheduled transitions,
//! recompute aggregate load, ask the policy for a delta, terminate or spawn,
//! then prune dead instances. Ticks are fully ordered; nothing here suspends
//! or runs concurrently.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::ServiceConfig;
use crate::error::HardValidationError;
use crate::instance::ServiceInstance;
use crate::policy::ScalingPolicy;
use crate::state::InstanceState;
use crate::stats::{PoolSnapshot, StateCounts};
use crate::timing::ScalingTimeOptions;
use crate::types::{InstanceId, Timestamp};

/// A pool of service instances absorbing a time-varying applied load.
///
/// Instances are kept in recency order: new spawns go to the front, pruning
/// preserves the relative order of the rest. Each pool exclusively owns its
/// RNG; two pools built from the same configuration and seed replay the same
/// trajectory.
#[derive(Debug)]
pub struct TargetService<R: Rng = SmallRng> {
    current_time: Timestamp,
    applied_load: f64,
    scale_up_time: ScalingTimeOptions,
    scale_down_time: ScalingTimeOptions,
    service: ServiceConfig,
    experienced_load: f64,
    processed_load: f64,
    total_load_capability: f64,
    instances: VecDeque<ServiceInstance>,
    counts: StateCounts,
    next_instance_id: u64,
    rng: R,
}

impl TargetService<SmallRng> {
    /// Create a pool seeded for reproducible runs.
    pub fn new(
        service: ServiceConfig,
        scale_up_time: ScalingTimeOptions,
        scale_down_time: ScalingTimeOptions,
        start_time: Timestamp,
        applied_load: f64,
        seed: u64,
    ) -> Result<Self, HardValidationError> {
        Self::with_rng(
            service,
            scale_up_time,
            scale_down_time,
            start_time,
            applied_load,
            SmallRng::seed_from_u64(seed),
        )
    }
}

impl<R: Rng> TargetService<R> {
    /// Create a pool with a caller-supplied random source.
    ///
    /// The initial population is `service.starting_instances` freshly
    /// spawned instances followed by `service.ready_instances` pre-warmed
    /// ones.
    pub fn with_rng(
        service: ServiceConfig,
        scale_up_time: ScalingTimeOptions,
        scale_down_time: ScalingTimeOptions,
        start_time: Timestamp,
        applied_load: f64,
        mut rng: R,
    ) -> Result<Self, HardValidationError> {
        service.validate()?;

        if !applied_load.is_finite() || applied_load < 0.0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "applied_load",
                value: applied_load.to_string(),
                reason: "applied load must be finite and non-negative".to_string(),
            });
        }

        let mut instances = VecDeque::new();
        let mut next_instance_id = 0;

        for _ in 0..service.starting_instances {
            let id = InstanceId::new(next_instance_id);
            next_instance_id += 1;
            instances.push_back(ServiceInstance::spawn(
                id,
                start_time,
                &scale_up_time,
                service.instance_load_capability,
                &mut rng,
            ));
        }

        for _ in 0..service.ready_instances {
            let id = InstanceId::new(next_instance_id);
            next_instance_id += 1;
            instances.push_back(ServiceInstance::pre_ready(
                id,
                start_time,
                service.instance_load_capability,
            ));
        }

        let mut pool = Self {
            current_time: start_time,
            applied_load,
            scale_up_time,
            scale_down_time,
            service,
            experienced_load: 0.0,
            processed_load: 0.0,
            total_load_capability: 0.0,
            instances,
            counts: StateCounts::default(),
            next_instance_id,
            rng,
        };

        let (_, _, capability) = pool.compute_aggregate_load();
        pool.total_load_capability = capability;
        pool.counts = pool.recount();

        Ok(pool)
    }

    /// Count instances currently in the given state. O(n) scan.
    pub fn count(&self, state: InstanceState) -> usize {
        self.instances
            .iter()
            .filter(|instance| instance.state() == state)
            .count()
    }

    /// Per-state counts as refreshed at the end of the last tick.
    pub fn counts(&self) -> StateCounts {
        self.counts
    }

    /// Total number of instances in the pool, whatever their state.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Iterate over the pool's instances in recency order.
    pub fn instances(&self) -> impl Iterator<Item = &ServiceInstance> {
        self.instances.iter()
    }

    /// The simulated time of the last tick.
    pub fn current_time(&self) -> Timestamp {
        self.current_time
    }

    /// The load applied to the system at the last tick.
    pub fn applied_load(&self) -> f64 {
        self.applied_load
    }

    /// Total resource utilization of the system: per-state instance
    /// overheads plus the processed load.
    pub fn experienced_load(&self) -> f64 {
        self.experienced_load
    }

    /// How much of the applied load the pool actually absorbed.
    pub fn processed_load(&self) -> f64 {
        self.processed_load
    }

    /// Ready capacity net of baseline overhead.
    pub fn total_load_capability(&self) -> f64 {
        self.total_load_capability
    }

    /// The pool's public state, as handed to scaling policies.
    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            current_time: self.current_time,
            applied_load: self.applied_load,
            experienced_load: self.experienced_load,
            processed_load: self.processed_load,
            total_load_capability: self.total_load_capability,
            counts: self.counts,
        }
    }

    /// Pick up to `count` instances to terminate, most expendable first.
    ///
    /// Ordering contract: all Starting instances ascending by start time,
    /// then all Ready instances ascending by ready time. Ties keep the
    /// pool's recency order. Returns indices into the pool, fewer than
    /// requested if not enough instances are eligible.
    pub fn select_victims(&self, count: usize) -> Vec<usize> {
        let mut starting: Vec<usize> = (0..self.instances.len())
            .filter(|&i| self.instances[i].state() == InstanceState::Starting)
            .collect();
        starting.sort_by(|&a, &b| {
            self.instances[a]
                .started_at()
                .total_cmp(&self.instances[b].started_at())
        });

        let mut ready: Vec<usize> = (0..self.instances.len())
            .filter(|&i| self.instances[i].state() == InstanceState::Ready)
            .collect();
        // Ready instances always carry a realized ready time.
        ready.sort_by(|&a, &b| {
            let a_ready = self.instances[a]
                .ready_at()
                .unwrap_or(self.instances[a].started_at());
            let b_ready = self.instances[b]
                .ready_at()
                .unwrap_or(self.instances[b].started_at());
            a_ready.total_cmp(&b_ready)
        });

        starting.into_iter().chain(ready).take(count).collect()
    }

    /// Remove every Off instance, preserving the order of the rest.
    pub fn prune(&mut self) {
        self.instances
            .retain(|instance| instance.state() != InstanceState::Off);
    }

    /// Advance the pool one simulated tick.
    ///
    /// In order: update the clock and applied load, realize scheduled
    /// instance transitions, recompute aggregate load, ask the policy for a
    /// delta, apply it (terminations draw their duration from the
    /// scale-down options; spawns are capped by `max_spawns_per_tick`),
    /// prune Off instances, refresh the per-state counts. The caller is
    /// expected to supply monotonically non-decreasing tick times.
    pub fn tick<P>(&mut self, now: Timestamp, applied_load: f64, policy: &mut P)
    where
        P: ScalingPolicy + ?Sized,
    {
        self.current_time = now;
        self.applied_load = applied_load;

        for instance in &mut self.instances {
            instance.advance(now);
        }

        let (experienced, processed, capability) = self.compute_aggregate_load();
        self.experienced_load = experienced;
        self.processed_load = processed;
        self.total_load_capability = capability;
        self.counts = self.recount();

        let delta = policy.decide(&self.snapshot());

        if delta < 0 {
            let victims = self.select_victims(delta.unsigned_abs() as usize);
            tracing::debug!(
                time = now.as_secs(),
                delta,
                victims = victims.len(),
                "beginning terminations"
            );
            for index in victims {
                // Victims are filtered to Starting/Ready above, and nothing
                // between selection and termination changes their state.
                let _ = self.instances[index].begin_termination(
                    now,
                    &self.scale_down_time,
                    &mut self.rng,
                );
            }
        } else if delta > 0 {
            let spawns = (delta as usize).min(self.service.max_spawns_per_tick);
            tracing::debug!(time = now.as_secs(), delta, spawns, "spawning instances");
            for _ in 0..spawns {
                self.spawn_instance(now);
            }
        }

        self.prune();
        self.counts = self.recount();
    }

    fn spawn_instance(&mut self, now: Timestamp) {
        let id = InstanceId::new(self.next_instance_id);
        self.next_instance_id += 1;
        let instance = ServiceInstance::spawn(
            id,
            now,
            &self.scale_up_time,
            self.service.instance_load_capability,
            &mut self.rng,
        );
        self.instances.push_front(instance);
    }

    /// Aggregate (experienced, processed, capability) over all instances.
    ///
    /// Every non-Off instance contributes a constant per-state overhead;
    /// only Ready instances contribute capacity, net of their baseline.
    /// Processed load is the applied load capped to that capacity, and is
    /// itself part of the experienced load.
    fn compute_aggregate_load(&self) -> (f64, f64, f64) {
        let mut experienced_load = 0.0;
        let mut total_load_capability = 0.0;

        for instance in &self.instances {
            let constant_load = match instance.state() {
                InstanceState::Starting => self.service.starting_load,
                InstanceState::Ready => self.service.instance_baseline_load,
                InstanceState::Terminating => self.service.terminating_load,
                InstanceState::Off => 0.0,
            };

            experienced_load += constant_load;

            if instance.state() == InstanceState::Ready {
                total_load_capability += instance.load_capability() - constant_load;
            }
        }

        let processed_load = self.applied_load.min(total_load_capability);
        experienced_load += processed_load;

        (experienced_load, processed_load, total_load_capability)
    }

    fn recount(&self) -> StateCounts {
        StateCounts {
            starting: self.count(InstanceState::Starting),
            ready: self.count(InstanceState::Ready),
            terminating: self.count(InstanceState::Terminating),
            off: self.count(InstanceState::Off),
        }
    }
}
