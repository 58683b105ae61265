//! The example data-processing workflow: `validate` → `process` → `finalize`.
//!
//! | step       | reads    | writes                |
//! |------------|----------|-----------------------|
//! | `validate` | `input`  | `valid`, `data`       |
//! | `process`  | `data`   | `processed`, `result` |
//! | `finalize` | `result` | `status`, `output`    |
//!
//! Each step forwards the value it reads unchanged under a new name, so the
//! caller's `input` comes back as `output`.

use agentstone_core::prelude::*;
use serde_json::Value;
use tracing::info;

pub const EXAMPLE_WORKFLOW: &str = "example-workflow";

#[derive(Debug, Deserialize)]
pub struct ValidateInput {
    pub input: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Validated {
    pub valid: bool,
    pub data: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Processed {
    pub processed: bool,
    pub result: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Finalized {
    pub status: String,
    pub output: Value,
}

pub fn validate_step() -> TypedStep<ValidateInput, Validated> {
    helpers::typed_step("validate", |ctx: ValidateInput| async move {
        info!("Validating input...");
        Ok::<_, FlowError>(Validated {
            valid: true,
            data: ctx.input,
        })
    })
    .with_contract(StepContract::new().reads(["input"]).writes(["valid", "data"]))
}

pub fn process_step() -> TypedStep<Validated, Processed> {
    helpers::typed_step("process", |ctx: Validated| async move {
        info!("Processing data...");
        Ok::<_, FlowError>(Processed {
            processed: true,
            result: ctx.data,
        })
    })
    .with_contract(
        StepContract::new()
            .reads(["data"])
            .writes(["processed", "result"]),
    )
}

pub fn finalize_step() -> TypedStep<Processed, Finalized> {
    helpers::typed_step("finalize", |ctx: Processed| async move {
        info!("Finalizing...");
        Ok::<_, FlowError>(Finalized {
            status: "complete".to_string(),
            output: ctx.result,
        })
    })
    .with_contract(StepContract::new().reads(["result"]).writes(["status", "output"]))
}

/// Flow table of the example workflow.
pub fn example_flow() -> FlowTable {
    FlowTable::new()
        .edge("validate", "process")
        .edge("process", "finalize")
        .terminal("finalize")
}

pub fn example_workflow() -> Result<Workflow> {
    Workflow::builder(EXAMPLE_WORKFLOW)
        .description("Simple data processing: validate, process, finalize")
        .input_fields(["input"])
        .step(validate_step())
        .step(process_step())
        .step(finalize_step())
        .flow(example_flow())
        .build()
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    /// Wraps a step and counts how often it ran and whether it saw `field`.
    #[derive(Debug)]
    struct Observed<S> {
        inner: S,
        field: &'static str,
        runs: Arc<AtomicUsize>,
        saw_field: Arc<AtomicUsize>,
    }

    impl<S> Observed<S> {
        fn new(inner: S, field: &'static str) -> Self {
            Self {
                inner,
                field,
                runs: Arc::new(AtomicUsize::new(0)),
                saw_field: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl<S: Step> Step for Observed<S> {
        async fn run(&self, context: Context) -> Result<Context> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if context.contains(self.field) {
                self.saw_field.fetch_add(1, Ordering::SeqCst);
            }
            self.inner.run(context).await
        }

        fn name(&self) -> String {
            self.inner.name()
        }

        fn contract(&self) -> StepContract {
            self.inner.contract()
        }
    }

    #[tokio::test]
    async fn example_workflow_forwards_input_to_output() {
        let workflow = example_workflow().unwrap();

        let output = workflow
            .execute(Context::new().with("input", "some data").unwrap())
            .await
            .unwrap();

        assert_eq!(
            output.into_value(),
            json!({"status": "complete", "output": "some data"})
        );
    }

    #[tokio::test]
    async fn example_workflow_runs_in_declared_order() {
        let workflow = example_workflow().unwrap();
        assert_eq!(workflow.step_names(), vec!["validate", "process", "finalize"]);

        let run = workflow
            .run(Context::new().with("input", json!({"nested": [1, 2]})).unwrap())
            .await
            .unwrap();
        let order: Vec<&str> = run.steps.iter().map(|s| s.step.as_str()).collect();
        assert_eq!(order, vec!["validate", "process", "finalize"]);
        assert_eq!(
            run.output.get_raw("output"),
            Some(&json!({"nested": [1, 2]}))
        );
    }

    #[tokio::test]
    async fn later_steps_always_see_their_inputs() {
        let process = Observed::new(process_step(), "data");
        let finalize = Observed::new(finalize_step(), "result");
        let (process_saw, finalize_saw) = (process.saw_field.clone(), finalize.saw_field.clone());

        let workflow = Workflow::builder("observed")
            .step(validate_step())
            .step(process)
            .step(finalize)
            .build()
            .unwrap();

        for input in ["a", "b", "c"] {
            workflow
                .execute(Context::new().with("input", input).unwrap())
                .await
                .unwrap();
        }

        assert_eq!(process_saw.load(Ordering::SeqCst), 3);
        assert_eq!(finalize_saw.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn failed_validation_skips_remaining_steps() {
        let process = Observed::new(process_step(), "data");
        let finalize = Observed::new(finalize_step(), "result");
        let (process_runs, finalize_runs) = (process.runs.clone(), finalize.runs.clone());

        let workflow = Workflow::builder("rejecting")
            .step(
                helpers::fn_step("validate", |_ctx: Context| async move {
                    Err::<Context, _>(FlowError::execution("input rejected"))
                })
                .with_contract(StepContract::new().reads(["input"]).writes(["valid", "data"])),
            )
            .step(process)
            .step(finalize)
            .flow(example_flow())
            .build()
            .unwrap();

        let err = workflow
            .execute(Context::new().with("input", "some data").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(&err, FlowError::StepFailed { step, .. } if step == "validate"));
        assert_eq!(err.root_cause().to_string(), "Error: input rejected");
        assert_eq!(process_runs.load(Ordering::SeqCst), 0);
        assert_eq!(finalize_runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn repeated_runs_produce_identical_output() {
        let workflow = example_workflow().unwrap();
        let input = Context::new().with("input", "some data").unwrap();

        let first = workflow.run(input.clone()).await.unwrap();
        let second = workflow.run(input).await.unwrap();

        assert_eq!(first.output, second.output);
        assert_ne!(first.run_id, second.run_id);
    }

    #[tokio::test]
    async fn missing_input_is_rejected_before_validate_runs() {
        let workflow = example_workflow().unwrap();

        let err = workflow.execute(Context::new()).await.unwrap_err();
        assert!(matches!(
            err.root_cause(),
            FlowError::MissingField { step, field } if step == "validate" && field == "input"
        ));
    }
}
