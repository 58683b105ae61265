//! # Agent Stone Server
//!
//! HTTP host for Agent Stone agents and workflows:
//!
//! - Configuration from the environment (`PORT`, `HOST`, `MASTRA_LOG_LEVEL`,
//!   `MASTRA_TELEMETRY_ENABLED`)
//! - The [`Stone`] runtime object holding every registered agent and workflow
//! - A JSON API over axum
//!
//! ## Routes
//!
//! | method | path                                | |
//! |--------|-------------------------------------|-|
//! | GET    | `/api/health`                       | liveness |
//! | GET    | `/api/agents`                       | registered agents |
//! | GET    | `/api/agents/{id}`                  | one agent |
//! | POST   | `/api/agents/{id}/generate`         | `{"prompt"}` → `{"text", "model"}` |
//! | GET    | `/api/workflows`                    | registered workflows |
//! | GET    | `/api/workflows/{name}`             | one workflow |
//! | POST   | `/api/workflows/{name}/execute`     | initial context → run output and trace |

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod runtime;
pub mod telemetry;

use std::sync::Arc;

use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::{Config, ServerConfig};
pub use error::ServerError;
pub use runtime::{AppState, Stone, StoneBuilder};

/// Build the HTTP router over `state`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api::api_router())
        .route("/api/health", axum::routing::get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(stone: Arc<Stone>) -> eyre::Result<()> {
    let address = stone.config().server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| eyre::eyre!("failed to bind to {address}: {e}"))?;

    tracing::info!(address = %listener.local_addr()?, "listening");

    axum::serve(listener, router(stone))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "server": "agentstone",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
