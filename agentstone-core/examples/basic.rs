//! Basic usage example of Agent Stone workflows.

use agentstone_core::prelude::*;
use tokio::sync::watch;

const FLOW: &str = "
- step: trim
  next: count
- step: count
  next: report
- step: report
";

#[derive(Debug, Deserialize)]
struct Raw {
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Trimmed {
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Counted {
    text: String,
    words: usize,
}

fn build() -> Result<Workflow> {
    Workflow::builder("word-count")
        .description("Trim text, count its words and report")
        .input_fields(["text"])
        // Steps are declared out of order; the flow table decides.
        .step(
            helpers::typed_step("report", |c: Counted| async move {
                println!("🏁 Reporting");
                Context::new()
                    .with("summary", format!("'{}' has {} words", c.text, c.words))
            })
            .with_contract(StepContract::new().reads(["text", "words"]).writes(["summary"])),
        )
        .step(
            helpers::typed_step("trim", |raw: Raw| async move {
                println!("✂️  Trimming");
                Ok::<_, FlowError>(Trimmed {
                    text: raw.text.trim().to_string(),
                })
            })
            .with_contract(StepContract::new().reads(["text"]).writes(["text"])),
        )
        .step(
            helpers::typed_step("count", |t: Trimmed| async move {
                println!("🔢 Counting");
                let words = t.text.split_whitespace().count();
                Ok::<_, FlowError>(Counted { text: t.text, words })
            })
            .with_contract(StepContract::new().reads(["text"]).writes(["text", "words"])),
        )
        .flow(FlowTable::from_yaml(FLOW)?)
        .build()
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("🚀 Agent Stone word-count example");
    let workflow = build()?;
    println!("Steps: {:?}", workflow.step_names());

    let run = workflow
        .run(Context::new().with("text", "  hello step chains  ")?)
        .await?;
    println!("📊 Output: {}", run.output.to_json());
    for record in &run.steps {
        println!(
            "   {} -> {:?} ({} ms)",
            record.step,
            record.status,
            record.duration_ms.unwrap_or_default()
        );
    }

    // A missing input field stops the chain before the first step runs.
    match workflow.execute(Context::new()).await {
        Ok(_) => println!("unexpected success"),
        Err(e) => println!("❌ Rejected: {e}"),
    }

    // Cancellation is observed at step boundaries.
    let (_tx, rx) = watch::channel(true);
    match workflow
        .run_with_cancel(Context::new().with("text", "never read")?, &rx)
        .await
    {
        Err(FlowError::Cancelled) => println!("🛑 Cancelled before the first step"),
        other => println!("unexpected: {other:?}"),
    }

    Ok(())
}
