// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Service instance lifecycle states with typed state transitions.
//!
//! Implements the instance lifecycle: Starting → Ready → Terminating → Off.
//! Invalid transitions result in LifecycleError.

use serde::{Deserialize, Serialize};

/// Service instance lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstanceState {
    /// Instance is booting and loading dependencies; consumes resources but
    /// does no work yet.
    Starting,

    /// Instance is warm and absorbing applied load up to its capability.
    Ready,

    /// Instance is shutting down; consumes resources but does no work.
    Terminating,

    /// Terminal state - the instance is gone and will be pruned.
    Off,
}

impl InstanceState {
    /// Get the state name for error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Starting => "Starting",
            Self::Ready => "Ready",
            Self::Terminating => "Terminating",
            Self::Off => "Off",
        }
    }

    /// Check if transition to the target state is valid.
    ///
    /// The lifecycle is strictly forward: no state is ever re-entered and
    /// nothing leaves Off.
    pub fn can_transition_to(&self, target: InstanceState) -> bool {
        matches!(
            (self, target),
            // From Starting
            (Self::Starting, Self::Ready) |
            (Self::Starting, Self::Terminating) |
            // From Ready
            (Self::Ready, Self::Terminating) |
            // From Terminating
            (Self::Terminating, Self::Off)
        )
    }

    /// Check if this is the terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Off)
    }
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(InstanceState::Starting.can_transition_to(InstanceState::Ready));
        assert!(InstanceState::Starting.can_transition_to(InstanceState::Terminating));
        assert!(InstanceState::Ready.can_transition_to(InstanceState::Terminating));
        assert!(InstanceState::Terminating.can_transition_to(InstanceState::Off));
    }

    #[test]
    fn test_no_backward_transitions() {
        assert!(!InstanceState::Ready.can_transition_to(InstanceState::Starting));
        assert!(!InstanceState::Terminating.can_transition_to(InstanceState::Ready));
        assert!(!InstanceState::Off.can_transition_to(InstanceState::Terminating));
        assert!(!InstanceState::Off.can_transition_to(InstanceState::Starting));
    }

    #[test]
    fn test_no_skipped_states() {
        assert!(!InstanceState::Starting.can_transition_to(InstanceState::Off));
        assert!(!InstanceState::Ready.can_transition_to(InstanceState::Off));
    }

    #[test]
    fn test_terminal_state() {
        assert!(InstanceState::Off.is_terminal());
        assert!(!InstanceState::Starting.is_terminal());
        assert!(!InstanceState::Ready.is_terminal());
        assert!(!InstanceState::Terminating.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(InstanceState::Starting.to_string(), "Starting");
        assert_eq!(InstanceState::Off.to_string(), "Off");
    }
}
