use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

/// Model provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    OpenAI,
    Anthropic,
    Google,
    Ollama,
}

impl ModelProvider {
    /// Short lowercase name used in model identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::Ollama => "ollama",
        }
    }

    /// Look a provider up by its short name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "openai" => Some(Self::OpenAI),
            "anthropic" => Some(Self::Anthropic),
            "google" | "gemini" => Some(Self::Google),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    /// Guess the provider from a bare model name.
    pub fn infer(model_name: &str) -> Self {
        let reasoning_series = model_name
            .strip_prefix('o')
            .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()));

        if model_name.starts_with("gpt") || reasoning_series {
            Self::OpenAI
        } else if model_name.starts_with("claude") {
            Self::Anthropic
        } else if model_name.starts_with("gemini") {
            Self::Google
        } else {
            Self::Ollama
        }
    }
}

/// Model configuration for genai integration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model provider
    pub provider: ModelProvider,
    /// Model name
    pub model_name: String,
    /// Model parameters
    #[serde(default)]
    pub parameters: ModelParameters,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::openai("gpt-4o-mini")
    }
}

impl ModelConfig {
    pub fn new(provider: ModelProvider, model_name: impl Into<String>) -> Self {
        Self {
            provider,
            model_name: model_name.into(),
            parameters: ModelParameters::default(),
        }
    }

    /// OpenAI model by name.
    pub fn openai(model_name: impl Into<String>) -> Self {
        Self::new(ModelProvider::OpenAI, model_name)
    }

    /// Parse `provider:model`, `provider/model` or a bare model name.
    pub fn parse(identifier: &str) -> Result<Self> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(AgentError::configuration("model identifier is empty"));
        }

        match identifier.split_once([':', '/']) {
            Some((provider, model)) => {
                let provider = ModelProvider::from_name(provider).ok_or_else(|| {
                    AgentError::configuration(format!("unknown model provider '{provider}'"))
                })?;
                let model = model.trim_start_matches([':', '/']);
                if model.is_empty() {
                    return Err(AgentError::configuration(format!(
                        "model identifier '{identifier}' has no model name"
                    )));
                }
                Ok(Self::new(provider, model))
            }
            None => Ok(Self::new(ModelProvider::infer(identifier), identifier)),
        }
    }

    pub fn with_parameters(mut self, parameters: ModelParameters) -> Self {
        self.parameters = parameters;
        self
    }
}

impl fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider.as_str(), self.model_name)
    }
}

/// Sampling parameters. Unset values use the provider's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
}

impl ModelParameters {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// Text produced by a model for one prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    /// Generated text, exactly as returned by the model client
    pub text: String,
    /// Model that produced it, as `provider/model`
    pub model: String,
}

/// Public description of a registered agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub id: String,
    pub name: String,
    pub instructions: String,
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_config() {
        let config = ModelConfig::openai("gpt-4").with_parameters(
            ModelParameters::default()
                .with_temperature(0.8)
                .with_max_tokens(2048),
        );

        assert_eq!(config.model_name, "gpt-4");
        assert_eq!(config.parameters.temperature, Some(0.8));
        assert_eq!(config.parameters.max_tokens, Some(2048));
        assert_eq!(config.to_string(), "openai/gpt-4");
    }

    #[test]
    fn test_parse_model_identifiers() {
        let explicit = ModelConfig::parse("anthropic:claude-3-5-haiku-latest").unwrap();
        assert_eq!(explicit.provider, ModelProvider::Anthropic);
        assert_eq!(explicit.model_name, "claude-3-5-haiku-latest");

        let slashed = ModelConfig::parse("ollama/llama3.2").unwrap();
        assert_eq!(slashed.provider, ModelProvider::Ollama);
        assert_eq!(slashed.model_name, "llama3.2");

        assert_eq!(ModelConfig::parse("gpt-4o-mini").unwrap(), ModelConfig::default());
        assert_eq!(
            ModelConfig::parse("o3-mini").unwrap().provider,
            ModelProvider::OpenAI
        );
        assert_eq!(
            ModelConfig::parse("gemini-2.0-flash").unwrap().provider,
            ModelProvider::Google
        );
    }

    #[test]
    fn test_parse_rejects_bad_identifiers() {
        assert!(ModelConfig::parse("").is_err());
        assert!(ModelConfig::parse("mystery:model").is_err());
        assert!(ModelConfig::parse("openai:").is_err());
    }
}
