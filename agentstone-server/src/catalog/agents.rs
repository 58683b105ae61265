use std::sync::Arc;

use agentstone_agent::{Agent, ModelClient, ModelConfig, Result};

/// Registry id of the general assistant.
pub const GENERAL_ASSISTANT_ID: &str = "generalAssistant";

pub const GENERAL_ASSISTANT_INSTRUCTIONS: &str = "You are a helpful and friendly AI assistant.
You provide clear, accurate, and concise answers.
You are polite and professional in your responses.
If you don't know something, you admit it honestly.";

/// General purpose assistant; a template for new agents.
pub fn general_assistant(client: Arc<dyn ModelClient>) -> Result<Agent> {
    Agent::builder("General Assistant")
        .instructions(GENERAL_ASSISTANT_INSTRUCTIONS)
        .model(ModelConfig::openai("gpt-4o-mini"))
        .client(client)
        .build()
}
