// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Simulation driver: feed load samples into a pool, collect the trajectory.
//!
//! The driver is deliberately thin. It runs one tick per input sample and
//! yields one trace row per tick, in input order, as a lazy iterator. What a
//! consumer does with the rows (plot, store, aggregate) is its own business.

use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::policy::ScalingPolicy;
use crate::pool::TargetService;
use crate::types::Timestamp;

/// One input sample: the load applied to the system at a point in simulated
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadSample {
    pub time: Timestamp,
    pub applied_load: f64,
}

/// One output row of the simulated trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceRow {
    pub time: Timestamp,
    pub applied_load: f64,
    pub experienced_load: f64,
    pub ready_instances: usize,
    pub total_instances: usize,
}

/// Drives a pool through a sequence of load samples.
///
/// Implements `Iterator`: each `next()` consumes one sample, ticks the pool,
/// and yields the resulting row. The run is finite and not restartable;
/// re-running a scenario means building a fresh pool.
#[derive(Debug)]
pub struct Simulation<I, P, R: Rng = SmallRng> {
    pool: TargetService<R>,
    policy: P,
    samples: I,
}

impl<I, P, R> Simulation<I, P, R>
where
    I: Iterator<Item = LoadSample>,
    P: ScalingPolicy,
    R: Rng,
{
    /// Create a driver over a pool, a policy, and an ordered sample sequence.
    pub fn new<J>(pool: TargetService<R>, policy: P, samples: J) -> Self
    where
        J: IntoIterator<Item = LoadSample, IntoIter = I>,
    {
        Self {
            pool,
            policy,
            samples: samples.into_iter(),
        }
    }

    /// The pool being driven, for inspection between or after rows.
    pub fn pool(&self) -> &TargetService<R> {
        &self.pool
    }
}

impl<I, P, R> Iterator for Simulation<I, P, R>
where
    I: Iterator<Item = LoadSample>,
    P: ScalingPolicy,
    R: Rng,
{
    type Item = TraceRow;

    fn next(&mut self) -> Option<TraceRow> {
        let LoadSample { time, applied_load } = self.samples.next()?;

        self.pool.tick(time, applied_load, &mut self.policy);

        Some(TraceRow {
            time,
            applied_load,
            experienced_load: self.pool.experienced_load(),
            ready_instances: self.pool.counts().ready,
            total_instances: self.pool.instance_count(),
        })
    }
}
