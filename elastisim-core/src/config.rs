// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML scenario parser with strict schema validation.
//!
//! Validates simulation scenarios before any state is built. Any invalid
//! field results in a HardValidationError that prevents the run from
//! starting; nothing is silently defaulted away.

use std::path::Path;

use serde::Deserialize;

use crate::driver::{LoadSample, Simulation};
use crate::error::{HardValidationError, SimError, SimResult};
use crate::policy::{FixedDelta, ScalingPolicy, UtilizationPolicy};
use crate::pool::TargetService;
use crate::stats::PoolSnapshot;
use crate::timing::ScalingTimeOptions;
use crate::types::Timestamp;
use crate::workload::SquareWave;

/// Raw simulation section as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
struct RawSimulation {
    #[serde(default = "default_seed")]
    seed: u64,
    #[serde(default = "default_tick_secs")]
    tick_secs: f64,
    #[serde(default = "default_duration_ticks")]
    duration_ticks: usize,
}

fn default_seed() -> u64 {
    0
}

fn default_tick_secs() -> f64 {
    1.0
}

fn default_duration_ticks() -> usize {
    2100 // 35 minutes of one-second ticks
}

impl Default for RawSimulation {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            tick_secs: default_tick_secs(),
            duration_ticks: default_duration_ticks(),
        }
    }
}

/// Raw service section.
#[derive(Debug, Deserialize)]
struct RawService {
    #[serde(default = "default_instance_load_capability")]
    instance_load_capability: f64,
    #[serde(default = "default_instance_baseline_load")]
    instance_baseline_load: f64,
    #[serde(default = "default_starting_load")]
    starting_load: f64,
    #[serde(default = "default_terminating_load")]
    terminating_load: f64,
    #[serde(default)]
    starting_instances: usize,
    #[serde(default)]
    ready_instances: usize,
    #[serde(default = "default_max_spawns_per_tick")]
    max_spawns_per_tick: usize,
}

fn default_instance_load_capability() -> f64 {
    1.0
}

fn default_instance_baseline_load() -> f64 {
    0.05
}

fn default_starting_load() -> f64 {
    1.0
}

fn default_terminating_load() -> f64 {
    1.0
}

fn default_max_spawns_per_tick() -> usize {
    1
}

impl Default for RawService {
    fn default() -> Self {
        Self {
            instance_load_capability: default_instance_load_capability(),
            instance_baseline_load: default_instance_baseline_load(),
            starting_load: default_starting_load(),
            terminating_load: default_terminating_load(),
            starting_instances: 0,
            ready_instances: 0,
            max_spawns_per_tick: default_max_spawns_per_tick(),
        }
    }
}

/// Raw scaling time section.
#[derive(Debug, Deserialize)]
struct RawScalingTime {
    mean_secs: f64,
    std_dev_secs: f64,
}

/// Raw policy section. Either `fixed_delta` or the utilization fields may be
/// set, not both.
#[derive(Debug, Default, Deserialize)]
struct RawPolicy {
    fixed_delta: Option<i64>,
    target_utilization: Option<f64>,
    dead_band: Option<f64>,
}

/// Raw workload section.
#[derive(Debug, Deserialize)]
struct RawWorkload {
    #[serde(default = "default_period_ticks")]
    period_ticks: usize,
    #[serde(default = "default_duty_divisor")]
    duty_divisor: usize,
    #[serde(default = "default_phase")]
    phase: usize,
    #[serde(default = "default_high_load")]
    high_load: f64,
    #[serde(default = "default_low_load")]
    low_load: f64,
}

fn default_period_ticks() -> usize {
    300 // a peak boundary every five minutes of one-second ticks
}

fn default_duty_divisor() -> usize {
    2
}

fn default_phase() -> usize {
    1
}

fn default_high_load() -> f64 {
    10.0
}

fn default_low_load() -> f64 {
    0.2
}

impl Default for RawWorkload {
    fn default() -> Self {
        Self {
            period_ticks: default_period_ticks(),
            duty_divisor: default_duty_divisor(),
            phase: default_phase(),
            high_load: default_high_load(),
            low_load: default_low_load(),
        }
    }
}

/// Raw root scenario file.
#[derive(Debug, Deserialize)]
struct RawScenario {
    #[serde(default)]
    simulation: RawSimulation,
    #[serde(default)]
    service: RawService,
    scale_up: Option<RawScalingTime>,
    scale_down: Option<RawScalingTime>,
    #[serde(default)]
    policy: RawPolicy,
    #[serde(default)]
    workload: RawWorkload,
}

/// Validated simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub seed: u64,
    pub tick_secs: f64,
    pub duration_ticks: usize,
}

/// Validated per-instance cost model and initial population for a pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceConfig {
    /// How much load one Ready instance can handle.
    pub instance_load_capability: f64,
    /// Resources a Ready instance consumes without doing any work.
    pub instance_baseline_load: f64,
    /// Resources an instance consumes while starting up. A starting instance
    /// does no work but still loads and initializes dependencies.
    pub starting_load: f64,
    /// Resources an instance consumes while shutting down safely.
    pub terminating_load: f64,
    /// Instances already starting when the pool is created.
    pub starting_instances: usize,
    /// Pre-warmed instances ready when the pool is created.
    pub ready_instances: usize,
    /// Upper bound on instances spawned in a single tick, whatever delta the
    /// policy requests.
    pub max_spawns_per_tick: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            instance_load_capability: 1.0,
            instance_baseline_load: 0.05,
            starting_load: 1.0,
            terminating_load: 1.0,
            starting_instances: 0,
            ready_instances: 0,
            max_spawns_per_tick: 1,
        }
    }
}

impl ServiceConfig {
    /// Check every field; the pool refuses to build on the first violation.
    pub fn validate(&self) -> Result<(), HardValidationError> {
        if !self.instance_load_capability.is_finite() || self.instance_load_capability <= 0.0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "instance_load_capability",
                value: self.instance_load_capability.to_string(),
                reason: "per-instance capability must be finite and positive".to_string(),
            });
        }

        if !self.instance_baseline_load.is_finite()
            || self.instance_baseline_load < 0.0
            || self.instance_baseline_load >= self.instance_load_capability
        {
            return Err(HardValidationError::InvalidFieldValue {
                field: "instance_baseline_load",
                value: self.instance_baseline_load.to_string(),
                reason: format!(
                    "baseline load must be in [0, {}) so a Ready instance retains usable capacity",
                    self.instance_load_capability
                ),
            });
        }

        for (field, value) in [
            ("starting_load", self.starting_load),
            ("terminating_load", self.terminating_load),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(HardValidationError::InvalidFieldValue {
                    field,
                    value: value.to_string(),
                    reason: "per-state overhead must be finite and non-negative".to_string(),
                });
            }
        }

        if self.max_spawns_per_tick == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "max_spawns_per_tick",
                value: "0".to_string(),
                reason: "the spawn rate limit must allow at least one instance per tick"
                    .to_string(),
            });
        }

        Ok(())
    }
}

/// The policy selected by a scenario file.
#[derive(Debug, Clone, Copy)]
pub enum ScenarioPolicy {
    Utilization(UtilizationPolicy),
    Fixed(FixedDelta),
}

impl ScalingPolicy for ScenarioPolicy {
    fn decide(&mut self, snapshot: &PoolSnapshot) -> i64 {
        match self {
            Self::Utilization(policy) => policy.decide(snapshot),
            Self::Fixed(policy) => policy.decide(snapshot),
        }
    }
}

/// Complete validated scenario.
#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    pub simulation: SimulationConfig,
    pub service: ServiceConfig,
    pub scale_up: ScalingTimeOptions,
    pub scale_down: ScalingTimeOptions,
    pub policy: ScenarioPolicy,
    pub workload: SquareWave,
}

impl Scenario {
    /// Assemble a ready-to-run simulation from this scenario.
    ///
    /// The pool starts at the simulation epoch with the workload's first
    /// load level applied, seeded from the scenario for reproducible runs.
    pub fn build(
        &self,
    ) -> SimResult<Simulation<std::vec::IntoIter<LoadSample>, ScenarioPolicy>> {
        let pool = TargetService::new(
            self.service,
            self.scale_up,
            self.scale_down,
            Timestamp::ZERO,
            self.workload.load_at(0),
            self.simulation.seed,
        )?;

        let samples: Vec<LoadSample> = self
            .workload
            .samples(
                Timestamp::ZERO,
                self.simulation.tick_secs,
                self.simulation.duration_ticks,
            )
            .collect();

        Ok(Simulation::new(pool, self.policy, samples))
    }
}

/// Scenario loader with strict validation.
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Load and validate a scenario from a YAML file.
    /// Returns HardValidationError for any invalid fields.
    pub fn load_file(path: impl AsRef<Path>) -> SimResult<Scenario> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SimError::ScenarioNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SimError::Io {
            context: "reading scenario file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate a scenario from a YAML string.
    pub fn load_string(content: &str) -> SimResult<Scenario> {
        let raw: RawScenario =
            serde_yaml::from_str(content).map_err(|e| SimError::ScenarioParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw)
    }

    /// Validate raw configuration and convert to validated types.
    fn validate(raw: RawScenario) -> SimResult<Scenario> {
        let simulation = Self::validate_simulation(raw.simulation)?;

        let service = ServiceConfig {
            instance_load_capability: raw.service.instance_load_capability,
            instance_baseline_load: raw.service.instance_baseline_load,
            starting_load: raw.service.starting_load,
            terminating_load: raw.service.terminating_load,
            starting_instances: raw.service.starting_instances,
            ready_instances: raw.service.ready_instances,
            max_spawns_per_tick: raw.service.max_spawns_per_tick,
        };
        service.validate()?;

        let scale_up = Self::validate_scaling_time(raw.scale_up, "scale_up")?;
        let scale_down = Self::validate_scaling_time(raw.scale_down, "scale_down")?;

        let policy = Self::validate_policy(raw.policy)?;

        let workload = SquareWave::new(
            raw.workload.period_ticks,
            raw.workload.duty_divisor,
            raw.workload.phase,
            raw.workload.high_load,
            raw.workload.low_load,
        )?;

        Ok(Scenario {
            simulation,
            service,
            scale_up,
            scale_down,
            policy,
            workload,
        })
    }

    fn validate_simulation(raw: RawSimulation) -> SimResult<SimulationConfig> {
        if !raw.tick_secs.is_finite() || raw.tick_secs <= 0.0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "tick_secs",
                value: raw.tick_secs.to_string(),
                reason: "the tick length must be finite and positive".to_string(),
            }
            .into());
        }

        if raw.duration_ticks == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "duration_ticks",
                value: "0".to_string(),
                reason: "a simulation must run for at least one tick".to_string(),
            }
            .into());
        }

        Ok(SimulationConfig {
            seed: raw.seed,
            tick_secs: raw.tick_secs,
            duration_ticks: raw.duration_ticks,
        })
    }

    /// Both scaling time sections are required: a scenario with no start or
    /// stop durations cannot express any scaling at all.
    fn validate_scaling_time(
        raw: Option<RawScalingTime>,
        field: &'static str,
    ) -> SimResult<ScalingTimeOptions> {
        let raw = raw.ok_or_else(|| HardValidationError::MissingRequiredField {
            field,
            context: "scenario".to_string(),
        })?;

        Ok(ScalingTimeOptions::new(raw.mean_secs, raw.std_dev_secs)?)
    }

    fn validate_policy(raw: RawPolicy) -> SimResult<ScenarioPolicy> {
        if raw.fixed_delta.is_some()
            && (raw.target_utilization.is_some() || raw.dead_band.is_some())
        {
            return Err(HardValidationError::InvalidFieldValue {
                field: "policy",
                value: "fixed_delta + utilization fields".to_string(),
                reason: "a scenario selects either a fixed delta or a utilization policy, not both"
                    .to_string(),
            }
            .into());
        }

        if let Some(delta) = raw.fixed_delta {
            return Ok(ScenarioPolicy::Fixed(FixedDelta(delta)));
        }

        let target = raw.target_utilization.unwrap_or(0.5);
        let dead_band = raw.dead_band.unwrap_or(0.2);
        Ok(ScenarioPolicy::Utilization(UtilizationPolicy::new(
            target, dead_band,
        )?))
    }
}
