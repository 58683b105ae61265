//! Error types for Agent Stone agent operations.

use agentstone_core::prelude::FlowError;
use thiserror::Error;

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Main error type for agent operations.
#[derive(Error, Debug, Clone)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Context error: {0}")]
    Context(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AgentError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a model error
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if the error is a user error
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Validation(_) | Self::NotFound(_)
        )
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Model(_) => "model",
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Context(_) => "context",
            Self::Serialization(_) => "serialization",
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<genai::Error> for AgentError {
    fn from(err: genai::Error) -> Self {
        Self::Model(err.to_string())
    }
}

// Integration with agentstone-core
impl From<AgentError> for FlowError {
    fn from(err: AgentError) -> Self {
        match &err {
            AgentError::Configuration(_) => FlowError::construction(err.to_string()),
            AgentError::Model(_) => FlowError::execution(err.to_string()),
            _ => FlowError::context(err.to_string()),
        }
    }
}

impl From<FlowError> for AgentError {
    fn from(err: FlowError) -> Self {
        Self::Context(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = AgentError::model("test model error");
        assert_eq!(err.category(), "model");
        assert!(!err.is_user_error());
        assert!(AgentError::not_found("agent").is_user_error());
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let agent_err = AgentError::from(json_err);
        assert_eq!(agent_err.category(), "serialization");

        let flow_err = FlowError::from(AgentError::model("rate limited"));
        assert!(flow_err.to_string().contains("rate limited"));

        // A rejected prompt is bad step input, not a broken workflow
        let flow_err = FlowError::from(AgentError::validation("prompt must not be empty"));
        assert!(flow_err.is_input_error());
    }
}
