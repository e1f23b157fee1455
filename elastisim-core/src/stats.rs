// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

use serde::{Deserialize, Serialize};

use crate::state::InstanceState;
use crate::types::Timestamp;

/// Per-state instance counts, refreshed by the pool at the end of each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateCounts {
    pub starting: usize,
    pub ready: usize,
    pub terminating: usize,
    pub off: usize,
}

impl StateCounts {
    pub fn total(&self) -> usize {
        self.starting + self.ready + self.terminating + self.off
    }

    pub fn get(&self, state: InstanceState) -> usize {
        match state {
            InstanceState::Starting => self.starting,
            InstanceState::Ready => self.ready,
            InstanceState::Terminating => self.terminating,
            InstanceState::Off => self.off,
        }
    }
}

/// The pool's public state at one point in simulated time.
/// Handed to scaling policies and external observers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub current_time: Timestamp,
    pub applied_load: f64,
    pub experienced_load: f64,
    pub processed_load: f64,
    pub total_load_capability: f64,
    pub counts: StateCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_total() {
        let counts = StateCounts {
            starting: 1,
            ready: 2,
            terminating: 3,
            off: 4,
        };
        assert_eq!(counts.total(), 10);
        assert_eq!(counts.get(InstanceState::Ready), 2);
        assert_eq!(counts.get(InstanceState::Off), 4);
    }
}
