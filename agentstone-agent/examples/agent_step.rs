//! Run an agent as a workflow step.
//!
//! Uses a canned client so it works offline. Swap in [`GenaiClient`] and set
//! `OPENAI_API_KEY` to talk to a real model.

use std::sync::Arc;

use agentstone_agent::prelude::*;
use agentstone_core::prelude::{Context, Workflow, helpers};
use async_trait::async_trait;

#[derive(Debug)]
struct CannedClient;

#[async_trait]
impl ModelClient for CannedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Generation> {
        Ok(Generation {
            text: format!("(canned answer to '{}')", request.prompt),
            model: request.model.to_string(),
        })
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("🤖 Agent Stone agent demo");

    let agent = Arc::new(
        Agent::builder("Summarizer")
            .instructions("Summarize the question in one sentence.")
            .model(ModelConfig::parse("openai:gpt-4o-mini")?)
            .client(Arc::new(CannedClient))
            .build()?,
    );

    let direct = agent.generate("What is a step chain?").await?;
    println!("💬 {} says: {}", direct.model, direct.text);

    let workflow = Workflow::builder("ask")
        .step(helpers::fn_step("prepare", |ctx: Context| async move {
            let topic: String = ctx.require("prepare", "topic")?;
            Context::new().with("prompt", format!("Explain {topic}"))
        }))
        .step(AgentStep::new("answer", agent))
        .build()?;

    let output = workflow
        .execute(Context::new().with("topic", "workflows")?)
        .await?;
    println!("📄 Workflow output: {}", output.to_json());

    Ok(())
}
