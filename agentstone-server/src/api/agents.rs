use agentstone_agent::{AgentDescriptor, AgentError, Generation};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{get, post},
};
use serde::Deserialize;

use crate::{error::ServerError, runtime::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_agents))
        .route("/{id}", get(get_agent))
        .route("/{id}/generate", post(generate))
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    prompt: String,
}

/// GET /api/agents
async fn list_agents(State(state): State<AppState>) -> Json<serde_json::Value> {
    let agents = state.agents().descriptors().await;
    Json(serde_json::json!({ "agents": agents }))
}

/// GET /api/agents/{id}
async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AgentDescriptor>, ServerError> {
    let agent = state
        .agents()
        .get(&id)
        .await
        .ok_or_else(|| AgentError::not_found(format!("agent '{id}'")))?;
    Ok(Json(agent.descriptor(id)))
}

/// POST /api/agents/{id}/generate
///
/// One prompt in, the model's text out.
async fn generate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<Generation>, ServerError> {
    let Json(body) = body?;
    let generation = state.agents().generate(&id, &body.prompt).await?;
    Ok(Json(generation))
}
