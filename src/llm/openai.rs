//! OpenAI chat-completions summarizer.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{LlmError, LlmResult, Summarizer};

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Timeout applied to every completion request. Summaries over ten
/// abstracts can take a while.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI chat-completions client.
#[derive(Debug)]
pub struct OpenAiChat {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiChat {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `api_key` - OpenAI API key
    /// * `model` - Model name (defaults to [`DEFAULT_MODEL`] if None)
    pub fn new(api_key: String, model: Option<String>) -> LlmResult<Self> {
        if api_key.trim().is_empty() {
            return Err(LlmError::ConfigError("empty API key".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LlmError::ConfigError(e.to_string()))?;
        Ok(Self {
            http,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    /// The model this client completes with.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Summarizer for OpenAiChat {
    async fn summarize(&self, system_prompt: &str, user_prompt: &str) -> LlmResult<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            // Deterministic completions: the same filtered articles must
            // summarize the same way.
            temperature: 0.0,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt.to_string(),
                },
            ],
        };
        debug!(model = %self.model, prompt_chars = user_prompt.len(), "requesting summary");

        let response = self
            .http
            .post(COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::ApiError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError(format!(
                "completions API returned {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("no completion choices".to_string()))?;
        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_rejected() {
        let err = OpenAiChat::new("  ".to_string(), None).unwrap_err();
        assert!(matches!(err, LlmError::ConfigError(_)));
    }

    #[test]
    fn test_default_model() {
        let client = OpenAiChat::new("key".to_string(), None).unwrap();
        assert_eq!(client.model(), DEFAULT_MODEL);

        let client = OpenAiChat::new("key".to_string(), Some("gpt-4o".to_string())).unwrap();
        assert_eq!(client.model(), "gpt-4o");
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            messages: vec![ChatMessage {
                role: "system",
                content: "You summarize medical texts.".to_string(),
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["messages"][0]["role"], "system");
    }
}
