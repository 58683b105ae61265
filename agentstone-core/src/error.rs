//! Error types for Agent Stone workflows.

use thiserror::Error;

/// Result type for flow operations.
pub type Result<T> = std::result::Result<T, FlowError>;

/// Error types that can occur while building or executing a workflow.
#[derive(Error, Debug)]
pub enum FlowError {
    /// Context manipulation error.
    #[error("Context error: {0}")]
    Context(String),

    /// Workflow construction error.
    #[error("Construction error: {0}")]
    Construction(String),

    /// A step read a field that is not present in its input context.
    #[error("Step '{step}' requires field '{field}' which is missing from its context")]
    MissingField {
        /// Step that asked for the field
        step: String,
        /// Name of the missing field
        field: String,
    },

    /// A step produced a context without a field it declared.
    #[error("Step '{step}' did not write declared field '{field}'")]
    ContractViolation {
        /// Step that broke its contract
        step: String,
        /// Declared but missing output field
        field: String,
    },

    /// A step's operation failed, halting the rest of the chain.
    #[error("Workflow '{workflow}' failed at step '{step}': {source}")]
    StepFailed {
        /// Workflow being executed
        workflow: String,
        /// Step that failed
        step: String,
        /// Underlying failure
        #[source]
        source: Box<FlowError>,
    },

    /// Invalid step status transition.
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// Source status
        from: String,
        /// Target status
        to: String,
    },

    /// Lookup of an unregistered workflow.
    #[error("Workflow '{0}' not found")]
    NotFound(String),

    /// Serialization/Deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Flow table could not be parsed.
    #[error("Flow table error: {0}")]
    FlowTable(#[from] serde_yaml::Error),

    /// Generic error.
    #[error("Error: {0}")]
    Generic(#[from] eyre::Report),

    /// Execution was cancelled between steps.
    #[error("Flow execution was cancelled")]
    Cancelled,
}

impl FlowError {
    /// Create a new context error.
    pub fn context(msg: impl Into<String>) -> Self {
        Self::Context(msg.into())
    }

    /// Create a new construction error.
    pub fn construction(msg: impl Into<String>) -> Self {
        Self::Construction(msg.into())
    }

    /// Create an execution error.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Generic(eyre::eyre!(msg.into()))
    }

    /// Create a missing field error.
    pub fn missing_field(step: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            step: step.into(),
            field: field.into(),
        }
    }

    /// Create a new invalid transition error.
    pub fn invalid_transition(from: impl std::fmt::Debug, to: impl std::fmt::Debug) -> Self {
        Self::InvalidTransition {
            from: format!("{from:?}"),
            to: format!("{to:?}"),
        }
    }

    /// Strip any `StepFailed` wrappers and return the original failure.
    pub fn root_cause(&self) -> &FlowError {
        match self {
            Self::StepFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Whether the error was caused by caller-supplied input rather than the
    /// workflow itself.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::MissingField { .. } | Self::Context(_) | Self::Serialization(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_cause_unwraps_nested_step_failures() {
        let err = FlowError::StepFailed {
            workflow: "outer".to_string(),
            step: "validate".to_string(),
            source: Box::new(FlowError::missing_field("validate", "input")),
        };

        assert!(matches!(err.root_cause(), FlowError::MissingField { .. }));
        assert!(err.is_input_error());
        assert!(err.to_string().contains("failed at step 'validate'"));
    }

    #[test]
    fn generic_errors_are_not_input_errors() {
        let err = FlowError::execution("boom");
        assert!(!err.is_input_error());
        assert_eq!(err.to_string(), "Error: boom");
    }
}
