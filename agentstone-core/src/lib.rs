//! # Agent Stone Core
//!
//! Step-chain workflows for the Agent Stone host.
//!
//! ## Core Concepts
//!
//! - **Step**: A named async unit of work that turns one context into a new one
//! - **Context**: Field mapping threaded from step to step
//! - **Workflow**: An ordered chain of steps, validated when it is built
//! - **Registry**: Workflows addressable by name
//!
//! ## Quick Start
//!
//! ```rust
//! use agentstone_core::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let workflow = Workflow::builder("shout")
//!     .step(helpers::fn_step("upper", |ctx: Context| async move {
//!         let text: String = ctx.require("upper", "text")?;
//!         Context::new().with("text", text.to_uppercase())
//!     }))
//!     .build()?;
//!
//! let output = workflow
//!     .execute(Context::new().with("text", "hello")?)
//!     .await?;
//! assert_eq!(output.get_json::<String>("text")?, Some("HELLO".to_string()));
//! # Ok::<(), FlowError>(())
//! # }).unwrap();
//! ```

pub mod context;
pub mod error;
pub mod registry;
pub mod state;
pub mod step;
pub mod workflow;

/// Convenient re-exports for common use.
pub mod prelude {
    pub use async_trait::async_trait;
    pub use eyre;
    pub use serde::{Deserialize, Serialize};

    pub use crate::{
        context::{Context, ContextBuilder},
        error::{FlowError, Result},
        registry::WorkflowRegistry,
        state::StepStatus,
        step::{FnStep, Step, StepContract, TypedStep, helpers},
        workflow::{FlowEdge, FlowTable, StepRecord, Workflow, WorkflowBuilder, WorkflowRun},
    };
}
