//! Model client seam between agents and hosted language models.

use async_trait::async_trait;
use genai::{
    ModelIden,
    adapter::AdapterKind,
    chat::{ChatMessage, ChatOptions, ChatRequest},
};
use serde::Serialize;
use tracing::debug;

use crate::{
    agent_types::{Generation, ModelConfig, ModelParameters, ModelProvider},
    error::Result,
};

/// One prompt to send to a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Model to call
    pub model: ModelConfig,
    /// System instructions
    pub system: String,
    /// Caller prompt
    pub prompt: String,
}

/// Anything that can turn a prompt into text.
///
/// Network access, authentication and provider errors are the client's
/// business; agents only forward requests and return what comes back.
#[async_trait]
pub trait ModelClient: Send + Sync + std::fmt::Debug {
    /// Generate a completion for `request`.
    async fn complete(&self, request: CompletionRequest) -> Result<Generation>;
}

/// [`ModelClient`] backed by `genai`.
///
/// Requests are sent as `provider::model`, and the client's model mapper
/// turns that back into the matching genai adapter. The explicit provider of a
/// [`ModelConfig`] therefore wins over genai's guess from the model name. API
/// keys (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, ...) are read by genai.
#[derive(Clone)]
pub struct GenaiClient {
    client: genai::Client,
}

impl std::fmt::Debug for GenaiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiClient").finish_non_exhaustive()
    }
}

impl Default for GenaiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GenaiClient {
    /// Create a client that routes each request to its configured provider.
    pub fn new() -> Self {
        let client = genai::Client::builder()
            .with_model_mapper_fn(|model: ModelIden| Ok(route_model(model)))
            .build();
        Self { client }
    }
}

const PROVIDER_SEPARATOR: &str = "::";

/// genai adapter serving `provider`.
pub fn adapter_kind(provider: ModelProvider) -> AdapterKind {
    match provider {
        ModelProvider::OpenAI => AdapterKind::OpenAI,
        ModelProvider::Anthropic => AdapterKind::Anthropic,
        ModelProvider::Google => AdapterKind::Gemini,
        ModelProvider::Ollama => AdapterKind::Ollama,
    }
}

/// Model name handed to genai, carrying the provider explicitly.
pub fn qualified_model_name(model: &ModelConfig) -> String {
    format!(
        "{}{PROVIDER_SEPARATOR}{}",
        model.provider.as_str(),
        model.model_name
    )
}

/// Replace genai's guessed adapter with the provider named in a qualified
/// model name. Unqualified names are left alone.
fn route_model(model: ModelIden) -> ModelIden {
    let qualified = model.model_name.to_string();
    let routed = qualified
        .split_once(PROVIDER_SEPARATOR)
        .and_then(|(provider, name)| {
            ModelProvider::from_name(provider).map(|p| (adapter_kind(p), name.to_string()))
        });

    match routed {
        Some((kind, name)) => ModelIden::new(kind, name),
        None => model,
    }
}

fn chat_options(parameters: &ModelParameters) -> ChatOptions {
    let mut options = ChatOptions::default();
    if let Some(temperature) = parameters.temperature {
        options = options.with_temperature(f64::from(temperature));
    }
    if let Some(max_tokens) = parameters.max_tokens {
        options = options.with_max_tokens(max_tokens);
    }
    if let Some(top_p) = parameters.top_p {
        options = options.with_top_p(f64::from(top_p));
    }
    options
}

#[async_trait]
impl ModelClient for GenaiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Generation> {
        let chat = ChatRequest::default()
            .with_system(request.system)
            .append_message(ChatMessage::user(request.prompt));
        let options = chat_options(&request.model.parameters);

        let model = qualified_model_name(&request.model);
        debug!(%model, "sending chat request");
        let response = self.client.exec_chat(&model, chat, Some(&options)).await?;

        Ok(Generation {
            text: response.content_text_into_string().unwrap_or_default(),
            model: request.model.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_options_only_set_given_parameters() {
        let options = chat_options(&ModelParameters::default());
        assert_eq!(options.temperature, None);
        assert_eq!(options.max_tokens, None);

        let options = chat_options(
            &ModelParameters::default()
                .with_temperature(0.5)
                .with_max_tokens(256),
        );
        assert_eq!(options.temperature, Some(0.5));
        assert_eq!(options.max_tokens, Some(256));
        assert_eq!(options.top_p, None);
    }

    #[test]
    fn test_explicit_provider_selects_adapter() {
        let fine_tuned = ModelConfig::parse("openai:ft-custom").unwrap();
        let routed = route_model(ModelIden::new(
            AdapterKind::Ollama,
            qualified_model_name(&fine_tuned),
        ));
        assert_eq!(routed.adapter_kind, AdapterKind::OpenAI);
        assert_eq!(routed.model_name.to_string(), "ft-custom");

        let claude = ModelConfig::parse("anthropic/my-model").unwrap();
        let routed = route_model(ModelIden::new(
            AdapterKind::Ollama,
            qualified_model_name(&claude),
        ));
        assert_eq!(routed.adapter_kind, AdapterKind::Anthropic);
        assert_eq!(routed.model_name.to_string(), "my-model");
    }

    #[test]
    fn test_unqualified_names_keep_genai_choice() {
        let routed = route_model(ModelIden::new(AdapterKind::Ollama, "llama3"));
        assert_eq!(routed.adapter_kind, AdapterKind::Ollama);
        assert_eq!(routed.model_name.to_string(), "llama3");

        let routed = route_model(ModelIden::new(AdapterKind::Ollama, "nobody::llama3"));
        assert_eq!(routed.model_name.to_string(), "nobody::llama3");
    }

    #[test]
    fn test_every_provider_has_an_adapter() {
        assert_eq!(adapter_kind(ModelProvider::Google), AdapterKind::Gemini);
        assert_eq!(
            qualified_model_name(&ModelConfig::openai("gpt-4o-mini")),
            "openai::gpt-4o-mini"
        );
    }

    #[test]
    fn test_genai_client_builds_without_network() {
        let client = GenaiClient::new();
        assert!(format!("{client:?}").contains("GenaiClient"));
    }
}
