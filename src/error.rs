use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for probe execution.
///
/// Variants fall into two groups. `Assertion` and `ContractViolation` mean the
/// target behaved differently than expected; everything else means the probe
/// could not observe the target at all.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("{0}")]
    Assertion(String),

    #[error("contract violation: {0}")]
    ContractViolation(String),

    #[error("{operation} failed: {message}")]
    Execution { operation: String, message: String },

    #[error("cancelled")]
    Cancelled,

    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: String, after: Duration },

    #[error("Duplicate probe name: {0}")]
    DuplicateProbe(String),

    #[error("Unknown probe: {0}")]
    UnknownProbe(String),

    #[error("probe panicked: {0}")]
    Panicked(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ProbeError {
    /// Shorthand for an assertion failure.
    pub fn assertion(message: impl Into<String>) -> Self {
        ProbeError::Assertion(message.into())
    }

    /// Shorthand for an execution error against a named operation.
    pub fn execution(operation: impl Into<String>, message: impl Into<String>) -> Self {
        ProbeError::Execution {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// True when the error describes target behaviour rather than a harness
    /// or transport failure.
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            ProbeError::Assertion(_) | ProbeError::ContractViolation(_)
        )
    }
}

/// Result type alias for probe operations
pub type Result<T> = std::result::Result<T, ProbeError>;
