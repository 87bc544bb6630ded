//! OpenAI-compatible chat completions provider. Also covers Ollama, whose
//! local server speaks the same API without authentication.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::{CompletionProvider, LlmConfig, ProviderError, ProviderKind};

const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiProvider {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    requires_auth: bool,
}

impl OpenAiProvider {
    pub fn new(config: &LlmConfig) -> Self {
        let requires_auth = config.provider != ProviderKind::Ollama;
        let api_key = std::env::var("OPENAI_API_KEY").ok();
        if requires_auth && api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY not set; AI delegation will use the fallback reply");
        }
        let endpoint = config.endpoint.clone().unwrap_or_else(|| {
            if config.provider == ProviderKind::Ollama {
                let base = std::env::var("OLLAMA_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:11434".to_string());
                format!("{base}/v1/chat/completions")
            } else {
                OPENAI_ENDPOINT.to_string()
            }
        });
        Self {
            client: Client::new(),
            api_key,
            endpoint,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            requires_auth,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, ProviderError> {
        if self.requires_auth && self.api_key.is_none() {
            return Err(ProviderError::ConfigError(
                "OPENAI_API_KEY not set".to_string(),
            ));
        }

        let payload = json!({
            "model": self.model,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_message }
            ]
        });

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let text = body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .unwrap_or_default();
        if text.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(text.to_string())
    }

    fn is_configured(&self) -> bool {
        !self.requires_auth || self.api_key.is_some()
    }
}
