// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for Elastisim.
//!
//! This module defines explicit enum error types as per coding guidelines.
//! No `Box<dyn Error>`, no `anyhow::Result` - all errors are strongly typed.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::InstanceId;

/// Top-level error type for the Elastisim engine.
/// All errors are explicit variants - no catch-all or generic handling.
#[derive(Debug, Error)]
pub enum SimError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Scenarios
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Scenario file not found: {path}")]
    ScenarioNotFound { path: PathBuf },

    #[error("Scenario parse error: {message}")]
    ScenarioParse { message: String },

    // =========================================================================
    // Lifecycle Errors
    // =========================================================================
    #[error("Invalid lifecycle transition: {0}")]
    InvalidLifecycleTransition(#[from] LifecycleError),

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Hard validation errors reject a scenario before any simulation state is
/// built. Used when configuration is invalid and a run cannot meaningfully
/// start.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Missing required field: {field} in {context}")]
    MissingRequiredField {
        field: &'static str,
        context: String,
    },

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// Lifecycle errors for the service instance state machine.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Cannot transition from {from} to {to} for {instance}")]
    InvalidTransition {
        instance: InstanceId,
        from: &'static str,
        to: &'static str,
    },
}

/// Result type alias using SimError.
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_validation_error_display() {
        let err = HardValidationError::InvalidFieldValue {
            field: "instance_load_capability",
            value: "-1".to_string(),
            reason: "capability must be positive".to_string(),
        };
        assert!(err.to_string().contains("instance_load_capability"));
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn test_error_chain() {
        let validation_err = HardValidationError::MissingRequiredField {
            field: "scale_up",
            context: "scenario".to_string(),
        };
        let sim_err: SimError = validation_err.into();
        assert!(matches!(sim_err, SimError::HardValidation(_)));
    }

    #[test]
    fn test_lifecycle_error_display() {
        let err = LifecycleError::InvalidTransition {
            instance: InstanceId::new(7),
            from: "Off",
            to: "Terminating",
        };
        let text = err.to_string();
        assert!(text.contains("Off"));
        assert!(text.contains("Terminating"));
        assert!(text.contains("instance-7"));
    }
}
