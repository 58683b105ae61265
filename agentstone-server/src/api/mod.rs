pub mod agents;
pub mod workflows;

use axum::Router;

use crate::runtime::AppState;

/// Build the complete API router with all sub-routes.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/api/agents", agents::router())
        .nest("/api/workflows", workflows::router())
}
