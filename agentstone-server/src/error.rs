use agentstone_agent::AgentError;
use agentstone_core::prelude::FlowError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors surfaced by the host, both at startup and from API handlers.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Flow(#[from] FlowError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Agent(err) => match err {
                AgentError::NotFound(_) => StatusCode::NOT_FOUND,
                AgentError::Model(_) => StatusCode::BAD_GATEWAY,
                err if err.is_user_error() => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Flow(err) => match err.root_cause() {
                FlowError::NotFound(_) => StatusCode::NOT_FOUND,
                FlowError::Cancelled => StatusCode::CONFLICT,
                _ if err.is_input_error() => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

/// Unreadable request bodies are bad requests, answered in the same JSON shape
/// as every other API error.
impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            ServerError::from(AgentError::model("timeout")).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ServerError::from(FlowError::NotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );

        let missing = FlowError::StepFailed {
            workflow: "w".into(),
            step: "s".into(),
            source: Box::new(FlowError::missing_field("s", "input")),
        };
        assert_eq!(ServerError::from(missing).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServerError::from(FlowError::execution("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServerError::from(AgentError::validation("prompt must not be empty")).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
