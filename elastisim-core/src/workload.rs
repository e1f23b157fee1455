// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Synthetic workload generation.
//!
//! Produces the periodic peak-and-trough load profile used by the bundled
//! scenarios: load alternates between a high and a low level on a fixed
//! cycle of ticks.

use crate::driver::LoadSample;
use crate::error::HardValidationError;
use crate::types::Timestamp;

/// A square-wave load profile.
///
/// Ticks are grouped into windows of `period_ticks`; window `w` applies the
/// high load when `w % duty_divisor == phase`, the low load otherwise. With
/// a divisor of 2 the peak is present half the time; the phase selects
/// whether the run starts in a peak or a trough.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareWave {
    period_ticks: usize,
    duty_divisor: usize,
    phase: usize,
    high_load: f64,
    low_load: f64,
}

impl SquareWave {
    /// Create a square wave with validation.
    pub fn new(
        period_ticks: usize,
        duty_divisor: usize,
        phase: usize,
        high_load: f64,
        low_load: f64,
    ) -> Result<Self, HardValidationError> {
        if period_ticks == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "period_ticks",
                value: period_ticks.to_string(),
                reason: "the peak period must be at least one tick".to_string(),
            });
        }

        if duty_divisor == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "duty_divisor",
                value: duty_divisor.to_string(),
                reason: "the duty divisor must be at least 1".to_string(),
            });
        }

        if phase >= duty_divisor {
            return Err(HardValidationError::InvalidFieldValue {
                field: "phase",
                value: phase.to_string(),
                reason: format!("phase must be below the duty divisor ({})", duty_divisor),
            });
        }

        for (field, value) in [("high_load", high_load), ("low_load", low_load)] {
            if !value.is_finite() || value < 0.0 {
                return Err(HardValidationError::InvalidFieldValue {
                    field,
                    value: value.to_string(),
                    reason: "load levels must be finite and non-negative".to_string(),
                });
            }
        }

        Ok(Self {
            period_ticks,
            duty_divisor,
            phase,
            high_load,
            low_load,
        })
    }

    /// The load applied at the given tick index (starting from 0).
    pub fn load_at(&self, tick: usize) -> f64 {
        if (tick / self.period_ticks) % self.duty_divisor == self.phase {
            self.high_load
        } else {
            self.low_load
        }
    }

    /// Generate `ticks` load samples, one every `tick_secs` starting at
    /// `start + tick_secs`.
    pub fn samples(
        self,
        start: Timestamp,
        tick_secs: f64,
        ticks: usize,
    ) -> impl Iterator<Item = LoadSample> {
        (0..ticks).map(move |tick| LoadSample {
            time: start.offset((tick + 1) as f64 * tick_secs),
            applied_load: self.load_at(tick),
        })
    }
}

impl Default for SquareWave {
    /// A one-minute peak of load 10.0 every five minutes of one-second
    /// ticks, starting in a trough at load 0.2.
    fn default() -> Self {
        Self {
            period_ticks: 300,
            duty_divisor: 2,
            phase: 1,
            high_load: 10.0,
            low_load: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(SquareWave::new(300, 2, 1, 10.0, 0.2).is_ok());
        assert!(SquareWave::new(0, 2, 1, 10.0, 0.2).is_err());
        assert!(SquareWave::new(300, 0, 0, 10.0, 0.2).is_err());
        assert!(SquareWave::new(300, 2, 2, 10.0, 0.2).is_err());
        assert!(SquareWave::new(300, 2, 1, -1.0, 0.2).is_err());
        assert!(SquareWave::new(300, 2, 1, 10.0, f64::NAN).is_err());
    }

    #[test]
    fn test_alternating_windows() {
        let wave = SquareWave::new(10, 2, 1, 5.0, 0.5).unwrap();

        // Phase 1: the first window is the trough.
        assert_eq!(wave.load_at(0), 0.5);
        assert_eq!(wave.load_at(9), 0.5);
        assert_eq!(wave.load_at(10), 5.0);
        assert_eq!(wave.load_at(19), 5.0);
        assert_eq!(wave.load_at(20), 0.5);
    }

    #[test]
    fn test_phase_zero_starts_in_a_peak() {
        let wave = SquareWave::new(10, 2, 0, 5.0, 0.5).unwrap();
        assert_eq!(wave.load_at(0), 5.0);
        assert_eq!(wave.load_at(10), 0.5);
    }

    #[test]
    fn test_duty_divisor_stretches_the_trough() {
        // Peak one window in three.
        let wave = SquareWave::new(10, 3, 2, 5.0, 0.5).unwrap();
        assert_eq!(wave.load_at(0), 0.5);
        assert_eq!(wave.load_at(10), 0.5);
        assert_eq!(wave.load_at(20), 5.0);
        assert_eq!(wave.load_at(30), 0.5);
    }

    #[test]
    fn test_samples_step_forward_from_start() {
        let wave = SquareWave::new(2, 2, 0, 5.0, 0.5).unwrap();
        let start = Timestamp::from_secs(100.0).unwrap();

        let samples: Vec<LoadSample> = wave.samples(start, 1.0, 4).collect();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0].time.as_secs(), 101.0);
        assert_eq!(samples[3].time.as_secs(), 104.0);
        assert_eq!(samples[0].applied_load, 5.0);
        assert_eq!(samples[1].applied_load, 5.0);
        assert_eq!(samples[2].applied_load, 0.5);
        assert_eq!(samples[3].applied_load, 0.5);
    }
}
