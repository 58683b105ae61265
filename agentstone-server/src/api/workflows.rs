use agentstone_core::prelude::{Context, FlowError, Workflow, WorkflowRun};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{get, post},
};
use serde::Serialize;

use crate::{error::ServerError, runtime::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_workflows))
        .route("/{name}", get(get_workflow))
        .route("/{name}/execute", post(execute_workflow))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowSummary {
    name: String,
    description: Option<String>,
    steps: Vec<String>,
    input_fields: Vec<String>,
}

impl From<&Workflow> for WorkflowSummary {
    fn from(workflow: &Workflow) -> Self {
        Self {
            name: workflow.name().to_string(),
            description: workflow.description().map(str::to_string),
            steps: workflow.step_names(),
            input_fields: workflow.input_fields().to_vec(),
        }
    }
}

/// GET /api/workflows
async fn list_workflows(State(state): State<AppState>) -> Json<serde_json::Value> {
    let registry = state.workflows();
    let workflows: Vec<WorkflowSummary> = registry
        .list_flows()
        .into_iter()
        .filter_map(|name| registry.get(name))
        .map(|workflow| WorkflowSummary::from(workflow.as_ref()))
        .collect();
    Json(serde_json::json!({ "workflows": workflows }))
}

/// GET /api/workflows/{name}
async fn get_workflow(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<WorkflowSummary>, ServerError> {
    let workflow = state
        .workflows()
        .get(&name)
        .ok_or(FlowError::NotFound(name))?;
    Ok(Json(WorkflowSummary::from(workflow.as_ref())))
}

/// POST /api/workflows/{name}/execute
///
/// The request body is the initial context and must be a JSON object.
async fn execute_workflow(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<WorkflowRun>, ServerError> {
    let Json(body) = body?;
    let context = Context::from_value(body)?;
    let run = state.workflows().execute(&name, context).await?;
    Ok(Json(run))
}
