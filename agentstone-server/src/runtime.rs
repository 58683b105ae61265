//! The runtime object: configuration plus every registered agent and workflow.

use std::sync::Arc;

use agentstone_agent::{Agent, AgentRegistry};
use agentstone_core::prelude::{Workflow, WorkflowRegistry};
use tracing::info;

use crate::{config::Config, error::ServerError};

/// Shared handle given to HTTP handlers.
pub type AppState = Arc<Stone>;

/// Central registry handed to the HTTP host.
#[derive(Debug)]
pub struct Stone {
    config: Config,
    agents: AgentRegistry,
    workflows: WorkflowRegistry,
}

impl Stone {
    /// Start declaring agents and workflows.
    pub fn builder(config: Config) -> StoneBuilder {
        StoneBuilder {
            config,
            agents: Vec::new(),
            workflows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    pub fn workflows(&self) -> &WorkflowRegistry {
        &self.workflows
    }
}

/// Collects declarations; nothing is registered until [`StoneBuilder::build`].
pub struct StoneBuilder {
    config: Config,
    agents: Vec<(String, Agent)>,
    workflows: Vec<Workflow>,
}

impl StoneBuilder {
    /// Declare an agent under `id`.
    pub fn agent(mut self, id: impl Into<String>, agent: Agent) -> Self {
        self.agents.push((id.into(), agent));
        self
    }

    /// Declare a workflow under its own name.
    pub fn workflow(mut self, workflow: Workflow) -> Self {
        self.workflows.push(workflow);
        self
    }

    /// Register everything; duplicate ids abort startup.
    pub async fn build(self) -> Result<Stone, ServerError> {
        let agents = AgentRegistry::new();
        for (id, agent) in self.agents {
            agents.register(id, agent).await?;
        }

        let mut workflows = WorkflowRegistry::new();
        for workflow in self.workflows {
            workflows.register(workflow)?;
        }

        info!(
            name = %self.config.name,
            agents = agents.len().await,
            workflows = workflows.len(),
            "runtime ready"
        );

        Ok(Stone {
            config: self.config,
            agents,
            workflows,
        })
    }
}
