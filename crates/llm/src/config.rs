use std::time::Duration;

use microwins_core::generation::{CompletionOptions, GenerationOptions, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

/// Default base URL (Groq's OpenAI-compatible endpoint).
pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1";

pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Provider calls are never bounded tighter than this.
pub const MIN_TIMEOUT_SECS: u64 = 5;

/// Language-model provider configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL; `/chat/completions` is appended.
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Load provider configuration from environment variables.
    ///
    /// | Env Var            | Required | Default                          |
    /// |--------------------|----------|----------------------------------|
    /// | `LLM_API_URL`      | no       | `https://api.groq.com/openai/v1` |
    /// | `LLM_API_KEY`      | **yes**¹ | --                               |
    /// | `LLM_MODEL`        | no       | `llama-3.1-8b-instant`           |
    /// | `LLM_TEMPERATURE`  | no       | `0.3`                            |
    /// | `LLM_MAX_TOKENS`   | no       | `1024`                           |
    /// | `LLM_TIMEOUT_SECS` | no       | `30` (minimum `5`)               |
    ///
    /// ¹ `GROQ_API_KEY` is accepted when `LLM_API_KEY` is unset.
    ///
    /// # Panics
    ///
    /// Panics if no API key is set or a numeric variable does not parse.
    pub fn from_env() -> Self {
        let api_url = std::env::var("LLM_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.into())
            .trim_end_matches('/')
            .to_string();

        let api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("GROQ_API_KEY"))
            .expect("LLM_API_KEY or GROQ_API_KEY must be set in the environment");
        assert!(!api_key.is_empty(), "LLM_API_KEY must not be empty");

        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let temperature: f32 = std::env::var("LLM_TEMPERATURE")
            .unwrap_or_else(|_| DEFAULT_TEMPERATURE.to_string())
            .parse()
            .expect("LLM_TEMPERATURE must be a valid f32");

        let max_tokens: u32 = std::env::var("LLM_MAX_TOKENS")
            .unwrap_or_else(|_| DEFAULT_MAX_TOKENS.to_string())
            .parse()
            .expect("LLM_MAX_TOKENS must be a valid u32");

        let timeout_secs: u64 = std::env::var("LLM_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("LLM_TIMEOUT_SECS must be a valid u64");

        Self {
            api_url,
            api_key,
            model,
            temperature,
            max_tokens,
            timeout_secs: timeout_secs.max(MIN_TIMEOUT_SECS),
        }
    }

    /// Pipeline options derived from this configuration.
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            completion: CompletionOptions {
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            },
            timeout: Duration::from_secs(self.timeout_secs.max(MIN_TIMEOUT_SECS)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(timeout_secs: u64) -> LlmConfig {
        LlmConfig {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: "key".to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.5,
            max_tokens: 512,
            timeout_secs,
        }
    }

    #[test]
    fn generation_options_carry_sampling_settings() {
        let options = config(45).generation_options();
        assert_eq!(options.completion.temperature, 0.5);
        assert_eq!(options.completion.max_tokens, 512);
        assert_eq!(options.timeout, Duration::from_secs(45));
    }

    #[test]
    fn timeout_never_below_minimum() {
        assert_eq!(config(1).generation_options().timeout, Duration::from_secs(MIN_TIMEOUT_SECS));
    }
}
