pub mod agent;
pub mod agent_types;
pub mod client;
pub mod error;

// Re-exports for convenience
pub use agent::*;
pub use agent_types::*;
pub use client::*;
pub use error::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        agent::{Agent, AgentBuilder, AgentRegistry, AgentStep},
        agent_types::*,
        client::{CompletionRequest, GenaiClient, ModelClient},
        error::{AgentError, Result},
    };
}
