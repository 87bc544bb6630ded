//! Multi-provider LLM client for the AI delegate.
//!
//! Free-form messages go to one configured completion provider; the contract
//! is a single `complete(system, user)` call per message with no retry or
//! backoff. Failures never leave this layer as transport errors.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod gemini;
pub mod openai;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("response parse error: {0}")]
    ParseError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("provider returned an empty response")]
    EmptyResponse,
}

/// Supported completion providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    OpenAI,
    /// Ollama local server (OpenAI-compatible API, no key required).
    Ollama,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Ollama => "ollama",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAI),
            "ollama" => Ok(ProviderKind::Ollama),
            _ => Err(format!("unknown provider: {s}")),
        }
    }
}

/// Configuration for the AI delegate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Custom endpoint; overrides the provider default.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: "gemini-pro".to_string(),
            temperature: 0.4,
            max_tokens: 300,
            endpoint: None,
        }
    }
}

impl LlmConfig {
    /// Read provider settings from the environment, falling back to the
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let provider = std::env::var("LLM_PROVIDER")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.provider);
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| match provider {
            ProviderKind::Gemini => defaults.model.clone(),
            ProviderKind::OpenAI => "gpt-4o-mini".to_string(),
            ProviderKind::Ollama => "llama3".to_string(),
        });
        Self {
            provider,
            model,
            endpoint: std::env::var("LLM_ENDPOINT").ok(),
            ..defaults
        }
    }

    /// Build the configured provider.
    pub fn build(&self) -> Arc<dyn CompletionProvider> {
        match self.provider {
            ProviderKind::Gemini => Arc::new(GeminiProvider::new(self)),
            ProviderKind::OpenAI | ProviderKind::Ollama => Arc::new(OpenAiProvider::new(self)),
        }
    }
}

/// A generative-AI completion backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Issue one completion request: fixed system prompt, the user's literal
    /// message as the user turn. The reply text is returned verbatim.
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, ProviderError>;

    /// Whether enough configuration (key/endpoint) is present to attempt
    /// a call. Used for startup logging only.
    fn is_configured(&self) -> bool;
}
