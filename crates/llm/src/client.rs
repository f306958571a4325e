//! HTTP client for the `POST /chat/completions` endpoint.

use async_trait::async_trait;
use microwins_core::generation::{CompletionOptions, LanguageModel, ProviderError};
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

/// Errors from the chat-completions API layer.
#[derive(Debug, thiserror::Error)]
pub enum LlmApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("LLM API error ({status}): {body}")]
    ApiError {
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response carried no `choices[0].message.content`.
    #[error("LLM response contained no message content")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for one OpenAI-compatible provider.
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl ChatCompletionsClient {
    /// * `api_url` - Base URL, e.g. `https://api.groq.com/openai/v1`.
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, api_key, model)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String, api_key: String, model: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(config.api_url.clone(), config.api_key.clone(), config.model.clone())
    }

    /// Send a single user message and return the first choice's content.
    pub async fn chat(&self, prompt: &str, options: &CompletionOptions) -> Result<String, LlmApiError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let parsed: ChatResponse = response.json().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmApiError::EmptyResponse)
    }

    // ---- private helpers ----

    /// Return the response unchanged on success, or an
    /// [`LlmApiError::ApiError`] with the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, LlmApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(LlmApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionsClient {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String, ProviderError> {
        self.chat(prompt, options).await.map_err(|e| {
            tracing::warn!(model = %self.model, error = %e, "Chat completion failed");
            ProviderError(e.to_string())
        })
    }
}
