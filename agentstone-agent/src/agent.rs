//! Agent descriptors, their registry and their workflow adapter.

use std::{collections::HashMap, sync::Arc};

use agentstone_core::prelude::{Context, FlowError, Step, StepContract};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::{
    agent_types::{AgentDescriptor, Generation, ModelConfig},
    client::{CompletionRequest, ModelClient},
    error::{AgentError, Result},
};

/// A named binding of instructions to a model.
///
/// Building or registering an agent never talks to the model; the client is
/// only called from [`Agent::generate`].
pub struct Agent {
    name: String,
    instructions: String,
    model: ModelConfig,
    client: Arc<dyn ModelClient>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.model.to_string())
            .finish()
    }
}

impl Agent {
    /// Create a new agent builder.
    pub fn builder(name: impl Into<String>) -> AgentBuilder {
        AgentBuilder::new(name)
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// System instructions sent with every prompt
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Model configuration
    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    /// Describe this agent under the id it is registered with.
    pub fn descriptor(&self, id: impl Into<String>) -> AgentDescriptor {
        AgentDescriptor {
            id: id.into(),
            name: self.name.clone(),
            instructions: self.instructions.clone(),
            model: self.model.to_string(),
        }
    }

    /// Ask the model to respond to `prompt` under this agent's instructions.
    ///
    /// The client's text is returned as is and its errors are not retried.
    /// A blank prompt is rejected without calling the model.
    pub async fn generate(&self, prompt: &str) -> Result<Generation> {
        if prompt.trim().is_empty() {
            return Err(AgentError::validation("prompt must not be empty"));
        }

        info!(agent = %self.name, model = %self.model, "generating response");

        let request = CompletionRequest {
            model: self.model.clone(),
            system: self.instructions.clone(),
            prompt: prompt.to_string(),
        };

        self.client.complete(request).await.inspect_err(|e| {
            error!(agent = %self.name, error = %e, "model call failed");
        })
    }
}

/// Builder for creating Agent instances
pub struct AgentBuilder {
    name: String,
    instructions: Option<String>,
    model: ModelConfig,
    client: Option<Arc<dyn ModelClient>>,
}

impl AgentBuilder {
    /// Create a new builder with the agent's display name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: None,
            model: ModelConfig::default(),
            client: None,
        }
    }

    /// Set the system instructions
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Set the model configuration
    pub fn model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    /// Set the model client
    pub fn client(mut self, client: Arc<dyn ModelClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the agent
    pub fn build(self) -> Result<Agent> {
        if self.name.trim().is_empty() {
            return Err(AgentError::configuration("agent name must not be empty"));
        }
        let instructions = self
            .instructions
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                AgentError::configuration(format!("agent '{}' has no instructions", self.name))
            })?;
        let client = self.client.ok_or_else(|| {
            AgentError::configuration(format!("agent '{}' has no model client", self.name))
        })?;

        Ok(Agent {
            name: self.name,
            instructions,
            model: self.model,
            client,
        })
    }
}

/// Registry for managing multiple AI agents
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: Arc<RwLock<HashMap<String, Arc<Agent>>>>,
}

impl AgentRegistry {
    /// Create a new agent registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent under `id`; ids are unique
    pub async fn register(&self, id: impl Into<String>, agent: Agent) -> Result<Arc<Agent>> {
        let id = id.into();
        let mut agents = self.agents.write().await;
        if agents.contains_key(&id) {
            return Err(AgentError::configuration(format!(
                "agent '{id}' is already registered"
            )));
        }
        let agent = Arc::new(agent);
        agents.insert(id, agent.clone());
        Ok(agent)
    }

    /// Get an agent by id
    pub async fn get(&self, id: &str) -> Option<Arc<Agent>> {
        let agents = self.agents.read().await;
        agents.get(id).cloned()
    }

    /// Descriptors of all registered agents, sorted by id
    pub async fn descriptors(&self) -> Vec<AgentDescriptor> {
        let agents = self.agents.read().await;
        let mut descriptors: Vec<AgentDescriptor> = agents
            .iter()
            .map(|(id, agent)| agent.descriptor(id.clone()))
            .collect();
        descriptors.sort_by(|a, b| a.id.cmp(&b.id));
        descriptors
    }

    /// Generate with the agent registered under `id`
    pub async fn generate(&self, id: &str, prompt: &str) -> Result<Generation> {
        let agent = self
            .get(id)
            .await
            .ok_or_else(|| AgentError::not_found(format!("agent '{id}'")))?;
        agent.generate(prompt).await
    }

    /// Number of registered agents
    pub async fn len(&self) -> usize {
        self.agents.read().await.len()
    }

    /// Check if no agent is registered
    pub async fn is_empty(&self) -> bool {
        self.agents.read().await.is_empty()
    }
}

/// Runs an agent as one step of a workflow.
///
/// Reads the prompt from `prompt_field` and returns a context holding only
/// the generated text under `output_field`.
#[derive(Debug, Clone)]
pub struct AgentStep {
    name: String,
    agent: Arc<Agent>,
    prompt_field: String,
    output_field: String,
}

impl AgentStep {
    /// Create a step reading `prompt` and writing `text`.
    pub fn new(name: impl Into<String>, agent: Arc<Agent>) -> Self {
        Self {
            name: name.into(),
            agent,
            prompt_field: "prompt".to_string(),
            output_field: "text".to_string(),
        }
    }

    /// Read the prompt from a different field
    pub fn prompt_field(mut self, field: impl Into<String>) -> Self {
        self.prompt_field = field.into();
        self
    }

    /// Write the generated text to a different field
    pub fn output_field(mut self, field: impl Into<String>) -> Self {
        self.output_field = field.into();
        self
    }
}

#[async_trait]
impl Step for AgentStep {
    async fn run(&self, context: Context) -> std::result::Result<Context, FlowError> {
        let prompt: String = context.require(&self.name, &self.prompt_field)?;
        let generation = self.agent.generate(&prompt).await?;
        Context::new().with(self.output_field.as_str(), generation.text)
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn contract(&self) -> StepContract {
        StepContract::new()
            .reads([self.prompt_field.as_str()])
            .writes([self.output_field.as_str()])
    }
}
