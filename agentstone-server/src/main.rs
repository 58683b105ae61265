use std::sync::Arc;

use agentstone_agent::GenaiClient;
use agentstone_server::{Config, Stone, catalog, serve, telemetry};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let config = Config::from_env();
    telemetry::init_tracing(&config)?;

    let port = config.server.port;
    let client = Arc::new(GenaiClient::new());
    let stone = catalog::register_defaults(Stone::builder(config), client)?
        .build()
        .await?;

    println!("✅ Agent Stone initialized successfully");
    println!("🚀 Server running on port {port}");

    serve(Arc::new(stone)).await
}
