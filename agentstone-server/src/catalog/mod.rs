//! Agents and workflows shipped with the host.

pub mod agents;
pub mod workflows;

use std::sync::Arc;

use agentstone_agent::ModelClient;

use crate::{error::ServerError, runtime::StoneBuilder};

/// Declare the bundled General Assistant and example workflow on `builder`.
pub fn register_defaults(
    builder: StoneBuilder,
    client: Arc<dyn ModelClient>,
) -> Result<StoneBuilder, ServerError> {
    Ok(builder
        .agent(agents::GENERAL_ASSISTANT_ID, agents::general_assistant(client)?)
        .workflow(workflows::example_workflow()?))
}
