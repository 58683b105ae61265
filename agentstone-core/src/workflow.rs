//! Workflow declaration and the sequential step-chain executor.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::{
    context::Context,
    error::{FlowError, Result},
    state::StepStatus,
    step::Step,
};

/// One row of a flow table: a step and the step that follows it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEdge {
    /// Step this row describes.
    pub step: String,
    /// Step to run once `step` completes. `None` ends the chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Declared execution order of a workflow as `{step, next}` rows.
///
/// Only straight-line chains are accepted: each step has at most one `next`
/// and is the `next` of at most one other step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowTable {
    edges: Vec<FlowEdge>,
}

impl FlowTable {
    /// Create an empty flow table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row linking `step` to `next`.
    pub fn edge(mut self, step: impl Into<String>, next: impl Into<String>) -> Self {
        self.edges.push(FlowEdge {
            step: step.into(),
            next: Some(next.into()),
        });
        self
    }

    /// Add a row for a step that ends the chain.
    pub fn terminal(mut self, step: impl Into<String>) -> Self {
        self.edges.push(FlowEdge {
            step: step.into(),
            next: None,
        });
        self
    }

    /// Parse a flow table from YAML (or JSON, which is valid YAML).
    ///
    /// ```yaml
    /// - step: validate
    ///   next: process
    /// - step: process
    /// ```
    pub fn from_yaml(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Rows in declaration order.
    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    /// Resolve the table into a linear execution order over `declared` steps.
    fn resolve(&self, declared: &[String]) -> Result<Vec<String>> {
        let known: HashSet<&str> = declared.iter().map(String::as_str).collect();
        let mut next_of: HashMap<&str, Option<&str>> = HashMap::new();
        let mut targets: HashSet<&str> = HashSet::new();

        for edge in &self.edges {
            if !known.contains(edge.step.as_str()) {
                return Err(FlowError::construction(format!(
                    "flow references unknown step '{}'",
                    edge.step
                )));
            }
            if next_of.contains_key(edge.step.as_str()) {
                return Err(FlowError::construction(format!(
                    "step '{}' appears more than once in the flow; branching is not supported",
                    edge.step
                )));
            }
            if let Some(next) = edge.next.as_deref() {
                if !known.contains(next) {
                    return Err(FlowError::construction(format!(
                        "step '{}' names unknown next step '{next}'",
                        edge.step
                    )));
                }
                if !targets.insert(next) {
                    return Err(FlowError::construction(format!(
                        "step '{next}' is the next step of more than one step; joins are not supported"
                    )));
                }
            }
            next_of.insert(edge.step.as_str(), edge.next.as_deref());
        }

        for name in declared {
            let mentioned =
                next_of.contains_key(name.as_str()) || targets.contains(name.as_str());
            if !mentioned {
                return Err(FlowError::construction(format!(
                    "step '{name}' is declared but not part of the flow"
                )));
            }
        }

        let entries: Vec<&str> = declared
            .iter()
            .map(String::as_str)
            .filter(|name| !targets.contains(name))
            .collect();
        let entry = match entries.as_slice() {
            [entry] => *entry,
            [] => {
                return Err(FlowError::construction(
                    "flow has no entry step; `next` references form a cycle",
                ));
            }
            many => {
                return Err(FlowError::construction(format!(
                    "flow has more than one entry step: {}",
                    many.join(", ")
                )));
            }
        };

        let mut order = Vec::with_capacity(declared.len());
        let mut visited = HashSet::new();
        let mut current = Some(entry);
        while let Some(name) = current {
            if !visited.insert(name) {
                return Err(FlowError::construction(format!(
                    "cyclic `next` reference back to step '{name}'"
                )));
            }
            order.push(name.to_string());
            current = next_of.get(name).copied().flatten();
        }

        // Every step has at most one predecessor, so anything left over sits on
        // a loop that the entry step never reaches.
        let stranded: Vec<&str> = declared
            .iter()
            .map(String::as_str)
            .filter(|name| !visited.contains(name))
            .collect();
        if !stranded.is_empty() {
            return Err(FlowError::construction(format!(
                "cyclic `next` references among steps: {}",
                stranded.join(", ")
            )));
        }

        Ok(order)
    }
}

/// Execution record of one step within a run.
#[derive(Clone, Debug, Serialize)]
pub struct StepRecord {
    /// Step name
    pub step: String,
    /// Final status of the step in this run
    pub status: StepStatus,
    /// When the step's operation started
    pub started_at: Option<DateTime<Utc>>,
    /// How long the operation took, in milliseconds
    pub duration_ms: Option<u64>,
}

impl StepRecord {
    fn pending(step: String) -> Self {
        Self {
            step,
            status: StepStatus::Pending,
            started_at: None,
            duration_ms: None,
        }
    }
}

/// Result of a successful workflow run.
#[derive(Clone, Debug, Serialize)]
pub struct WorkflowRun {
    /// Unique id of this execution
    pub run_id: Uuid,
    /// Workflow that was executed
    pub workflow: String,
    /// Context returned by the last step
    pub output: Context,
    /// Per-step trace in execution order
    pub steps: Vec<StepRecord>,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Total run time in milliseconds
    pub duration_ms: u64,
}

/// A named, ordered chain of steps.
///
/// Steps run strictly one after another. Each step receives the context
/// produced by its predecessor (the caller's context for the first one) and
/// the context of the last step is the result of the run. A failing step
/// stops the chain and the error reaches the caller unchanged, wrapped in
/// [`FlowError::StepFailed`].
pub struct Workflow {
    name: String,
    description: Option<String>,
    steps: Vec<Arc<dyn Step>>,
    input_fields: Vec<String>,
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("name", &self.name)
            .field("steps", &self.step_names())
            .finish()
    }
}

impl Workflow {
    /// Create a new workflow builder.
    pub fn builder(name: impl Into<String>) -> WorkflowBuilder {
        WorkflowBuilder::new(name)
    }

    /// Get the workflow name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the workflow description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<String> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Fields callers are expected to supply in the initial context.
    pub fn input_fields(&self) -> &[String] {
        &self.input_fields
    }

    /// Run the chain and return only the final context.
    pub async fn execute(&self, context: Context) -> Result<Context> {
        self.run(context).await.map(|run| run.output)
    }

    /// Run the chain and return the final context with its trace.
    pub async fn run(&self, context: Context) -> Result<WorkflowRun> {
        self.drive(context, None).await
    }

    /// Run the chain, checking `cancel` before each step.
    ///
    /// A step that has already started is never interrupted; cancellation
    /// takes effect at the next step boundary.
    pub async fn run_with_cancel(
        &self,
        context: Context,
        cancel: &watch::Receiver<bool>,
    ) -> Result<WorkflowRun> {
        self.drive(context, Some(cancel)).await
    }

    async fn drive(
        &self,
        context: Context,
        cancel: Option<&watch::Receiver<bool>>,
    ) -> Result<WorkflowRun> {
        let run_id = Uuid::new_v4();
        let span = info_span!("workflow", workflow = %self.name, %run_id);

        async move {
            let started_at = Utc::now();
            let start = Instant::now();
            let mut trace: Vec<StepRecord> = self
                .steps
                .iter()
                .map(|step| StepRecord::pending(step.name()))
                .collect();
            let mut context = context;

            info!(steps = self.steps.len(), "workflow started");

            for (step, record) in self.steps.iter().zip(trace.iter_mut()) {
                let cancelled = cancel.map(|rx| *rx.borrow()).unwrap_or(false);
                if cancelled {
                    info!(step = %record.step, "workflow cancelled before step");
                    record_run(&self.name, "cancelled", start.elapsed());
                    return Err(FlowError::Cancelled);
                }

                let contract = step.contract();
                if let Some(field) = contract.missing_read(&context) {
                    record_run(&self.name, "failed", start.elapsed());
                    return Err(self.step_failed(
                        &record.step,
                        FlowError::missing_field(&record.step, field),
                    ));
                }

                record.status.transition(StepStatus::Running)?;
                record.started_at = Some(Utc::now());
                let step_start = Instant::now();

                let outcome = step
                    .run(context)
                    .instrument(info_span!("step", step = %record.step))
                    .await;
                let elapsed = step_start.elapsed();
                record.duration_ms = Some(millis(elapsed));

                let produced = match outcome {
                    Ok(produced) => produced,
                    Err(error) => {
                        record.status.transition(StepStatus::Failed)?;
                        warn!(step = %record.step, %error, "step failed");
                        record_run(&self.name, "failed", start.elapsed());
                        return Err(self.step_failed(&record.step, error));
                    }
                };

                if let Some(field) = contract.missing_write(&produced) {
                    record.status.transition(StepStatus::Failed)?;
                    record_run(&self.name, "failed", start.elapsed());
                    return Err(self.step_failed(
                        &record.step,
                        FlowError::ContractViolation {
                            step: record.step.clone(),
                            field: field.to_string(),
                        },
                    ));
                }

                record.status.transition(StepStatus::Completed)?;
                debug!(step = %record.step, elapsed_ms = millis(elapsed), "step completed");
                context = produced;
            }

            let duration = start.elapsed();
            record_run(&self.name, "completed", duration);
            info!(elapsed_ms = millis(duration), "workflow completed");

            Ok(WorkflowRun {
                run_id,
                workflow: self.name.clone(),
                output: context,
                steps: trace,
                started_at,
                duration_ms: millis(duration),
            })
        }
        .instrument(span)
        .await
    }

    fn step_failed(&self, step: &str, source: FlowError) -> FlowError {
        FlowError::StepFailed {
            workflow: self.name.clone(),
            step: step.to_string(),
            source: Box::new(source),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(feature = "metrics")]
fn record_run(workflow: &str, outcome: &'static str, duration: Duration) {
    metrics::counter!(
        "agentstone_workflow_runs_total",
        "workflow" => workflow.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!(
        "agentstone_workflow_run_seconds",
        "workflow" => workflow.to_string()
    )
    .record(duration.as_secs_f64());
}

#[cfg(not(feature = "metrics"))]
fn record_run(_workflow: &str, _outcome: &'static str, _duration: Duration) {}

/// Builder for constructing workflows.
pub struct WorkflowBuilder {
    name: String,
    description: Option<String>,
    steps: Vec<Arc<dyn Step>>,
    flow: Option<FlowTable>,
    input_fields: Vec<String>,
}

impl WorkflowBuilder {
    /// Create a new workflow builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            steps: Vec::new(),
            flow: None,
            input_fields: Vec::new(),
        }
    }

    /// Set a human readable description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare a step. Without a flow table, steps run in declaration order.
    pub fn step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    /// Set the execution order explicitly.
    pub fn flow(mut self, flow: FlowTable) -> Self {
        self.flow = Some(flow);
        self
    }

    /// Fields the caller must supply. Checked against the first step's reads.
    pub fn input_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Validate the declaration and build the workflow.
    pub fn build(self) -> Result<Workflow> {
        if self.name.trim().is_empty() {
            return Err(FlowError::construction("Workflow name must not be empty"));
        }
        if self.steps.is_empty() {
            return Err(FlowError::construction(format!(
                "Workflow '{}' has no steps",
                self.name
            )));
        }

        let names: Vec<String> = self.steps.iter().map(|step| step.name()).collect();
        let mut seen = HashSet::new();
        for name in &names {
            if name.trim().is_empty() {
                return Err(FlowError::construction("Step name must not be empty"));
            }
            if !seen.insert(name.as_str()) {
                return Err(FlowError::construction(format!(
                    "Step '{name}' is declared more than once"
                )));
            }
        }

        let order = match &self.flow {
            Some(flow) => flow.resolve(&names)?,
            None => names.clone(),
        };

        let mut by_name: HashMap<String, Arc<dyn Step>> =
            names.into_iter().zip(self.steps).collect();
        let steps: Vec<Arc<dyn Step>> = order
            .iter()
            .filter_map(|name| by_name.remove(name))
            .collect();

        check_contracts(&steps, &self.input_fields)?;

        Ok(Workflow {
            name: self.name,
            description: self.description,
            steps,
            input_fields: self.input_fields,
        })
    }
}

/// Each declared read must be produced by the step right before it.
fn check_contracts(steps: &[Arc<dyn Step>], input_fields: &[String]) -> Result<()> {
    let mut available: Option<(String, Vec<String>)> = if input_fields.is_empty() {
        None
    } else {
        Some(("the workflow input".to_string(), input_fields.to_vec()))
    };

    for step in steps {
        let contract = step.contract();
        if let Some((producer, fields)) = &available {
            if let Some(field) = contract.reads.iter().find(|field| !fields.contains(field)) {
                return Err(FlowError::construction(format!(
                    "step '{}' reads '{field}' but {producer} does not provide it",
                    step.name()
                )));
            }
        }
        available = if contract.writes.is_empty() {
            None
        } else {
            Some((format!("step '{}'", step.name()), contract.writes))
        };
    }

    Ok(())
}
