//! Analyst gateway
//!
//! Transport-only client for the language-model completion service. The
//! gateway sends a fixed (system, user) message pair and hands back the raw
//! text of the first completion choice. It never retries and holds no
//! business logic; retry and fallback decisions live in the controller.

use crate::error::PipelineError;
use serde::Deserialize;

/// Completion endpoint for the Mistral chat API
const MISTRAL_CHAT_URL: &str = "https://api.mistral.ai/v1/chat/completions";

/// Environment variable holding the analyst API credential
pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";

/// Environment variable overriding the model name
pub const MODEL_ENV: &str = "MISTRAL_MODEL";

/// Known placeholder credential; treated the same as no credential at all
pub const PLACEHOLDER_API_KEY: &str = "sk-test-placeholder-key-for-development";

/// Model used when no override is configured
pub const DEFAULT_MODEL: &str = "mistral-large-latest";

/// Sampling temperature for analysis completions
pub const TEMPERATURE: f64 = 0.3;

/// Token ceiling for analysis completions
pub const MAX_TOKENS: u32 = 2000;

/// Analyst configuration resolved from process environment at call time
#[derive(Debug, Clone)]
pub struct AnalystConfig {
    pub api_key: String,
    pub model: String,
}

impl AnalystConfig {
    /// Read analyst configuration from the environment.
    ///
    /// Returns `None` when the credential is absent, empty, or the known
    /// placeholder value; the caller then treats the analyst as unavailable
    /// and takes the mock path without invoking the gateway.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var(API_KEY_ENV).ok()?;
        if api_key.is_empty() || api_key == PLACEHOLDER_API_KEY {
            return None;
        }
        let model = std::env::var(MODEL_ENV)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Some(Self { api_key, model })
    }
}

/// Trait seam for the completion service, substitutable in tests
pub trait AnalystClient {
    /// Request one completion for the given system/user message pair and
    /// return its raw text.
    fn complete(&self, system_instruction: &str, user_prompt: &str)
        -> Result<String, PipelineError>;
}

/// Production analyst backed by the Mistral chat-completions API
pub struct MistralAnalyst {
    config: AnalystConfig,
    client: reqwest::blocking::Client,
}

impl MistralAnalyst {
    pub fn new(config: AnalystConfig) -> Self {
        Self {
            config,
            client: reqwest::blocking::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl AnalystClient for MistralAnalyst {
    fn complete(
        &self,
        system_instruction: &str,
        user_prompt: &str,
    ) -> Result<String, PipelineError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system_instruction },
                { "role": "user", "content": user_prompt }
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });

        let response = self
            .client
            .post(MISTRAL_CHAT_URL)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(PipelineError::AnalystService(format!(
                "HTTP {status}: {detail}"
            )));
        }

        let completion: ChatCompletionResponse = response.json()?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(PipelineError::NoResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment mutations share one test so parallel tests cannot race
    #[test]
    fn test_config_from_env_gating() {
        std::env::remove_var(API_KEY_ENV);
        std::env::remove_var(MODEL_ENV);
        assert!(AnalystConfig::from_env().is_none());

        std::env::set_var(API_KEY_ENV, "");
        assert!(AnalystConfig::from_env().is_none());

        std::env::set_var(API_KEY_ENV, PLACEHOLDER_API_KEY);
        assert!(AnalystConfig::from_env().is_none());

        std::env::set_var(API_KEY_ENV, "sk-live-key");
        let config = AnalystConfig::from_env().unwrap();
        assert_eq!(config.api_key, "sk-live-key");
        assert_eq!(config.model, DEFAULT_MODEL);

        std::env::set_var(MODEL_ENV, "mistral-small-latest");
        let config = AnalystConfig::from_env().unwrap();
        assert_eq!(config.model, "mistral-small-latest");

        std::env::remove_var(API_KEY_ENV);
        std::env::remove_var(MODEL_ENV);
    }

    #[test]
    fn test_completion_response_parsing() {
        let json = r#"{
            "choices": [
                { "message": { "role": "assistant", "content": "{\"scores\": []}" } }
            ]
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("{\"scores\": []}")
        );
    }
}
