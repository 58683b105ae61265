//! Registry of named workflows.

use std::{collections::HashMap, sync::Arc};

use crate::{
    context::Context,
    error::{FlowError, Result},
    workflow::{Workflow, WorkflowRun},
};

/// Workflows addressable by name.
///
/// Filled once at startup; lookups hand out shared handles so concurrent runs
/// never need a lock.
#[derive(Clone, Debug, Default)]
pub struct WorkflowRegistry {
    flows: HashMap<String, Arc<Workflow>>,
}

impl WorkflowRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a workflow under its own name.
    pub fn register(&mut self, workflow: Workflow) -> Result<()> {
        let name = workflow.name().to_string();
        if self.flows.contains_key(&name) {
            return Err(FlowError::construction(format!(
                "Workflow '{name}' is already registered"
            )));
        }
        tracing::debug!(workflow = %name, steps = ?workflow.step_names(), "workflow registered");
        self.flows.insert(name, Arc::new(workflow));
        Ok(())
    }

    /// Get a workflow by name.
    pub fn get(&self, name: &str) -> Option<Arc<Workflow>> {
        self.flows.get(name).cloned()
    }

    /// Run a registered workflow.
    pub async fn execute(&self, name: &str, context: Context) -> Result<WorkflowRun> {
        let flow = self
            .get(name)
            .ok_or_else(|| FlowError::NotFound(name.to_string()))?;

        flow.run(context).await
    }

    /// Registered workflow names, sorted.
    pub fn list_flows(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.flows.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered workflows.
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    /// Check if no workflow is registered.
    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}
