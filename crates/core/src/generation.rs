//! Generation pipeline: redact, build prompt, call the model once, validate.

use std::time::Duration;

use async_trait::async_trait;

use crate::breakdown::{parse_breakdown, BreakdownMode, TaskBreakdown};
use crate::error::CoreError;
use crate::prompt::build_prompt;
use crate::redact::redact;

/// Default sampling temperature for breakdown generation.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Default completion budget in tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Default upper bound on one provider call.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Language-model contract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Failure reported by a language-model provider.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

/// A text-completion provider.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send `prompt` and return the raw completion text.
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String, ProviderError>;
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub completion: CompletionOptions,
    pub timeout: Duration,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            completion: CompletionOptions::default(),
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }
}

/// Turn a free-text task description into a validated breakdown.
///
/// The provider is called exactly once. Errors:
/// - [`CoreError::InvalidInput`] for an empty description or a malformed profile.
/// - [`CoreError::Generation`] when the provider fails or exceeds `options.timeout`.
/// - [`CoreError::SchemaValidation`] when the answer does not satisfy the breakdown schema.
pub async fn generate_breakdown(
    llm: &dyn LanguageModel,
    task_description: &str,
    mode: &BreakdownMode,
    options: &GenerationOptions,
) -> Result<TaskBreakdown, CoreError> {
    let description = task_description.trim();
    if description.is_empty() {
        return Err(CoreError::InvalidInput(
            "Task description must not be empty".to_string(),
        ));
    }
    if let BreakdownMode::Profile(profile) = mode {
        profile.validate()?;
    }

    let prompt = build_prompt(mode, &redact(description));
    let granularity = mode.granularity();
    tracing::debug!(
        granularity = %granularity,
        prompt_len = prompt.len(),
        "Requesting task breakdown",
    );

    let raw = match tokio::time::timeout(options.timeout, llm.complete(&prompt, &options.completion)).await {
        Ok(Ok(raw)) => raw,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Language model call failed");
            return Err(CoreError::Generation(e.to_string()));
        }
        Err(_) => {
            tracing::error!(timeout_secs = options.timeout.as_secs_f64(), "Language model call timed out");
            return Err(CoreError::Generation(format!(
                "Provider did not respond within {:?}",
                options.timeout
            )));
        }
    };

    let breakdown = parse_breakdown(&raw, granularity, mode.schema()).inspect_err(|e| {
        tracing::warn!(error = %e, "Rejected model output");
    })?;

    tracing::info!(
        task_name = %breakdown.task_name,
        step_count = breakdown.steps.len(),
        difficulty = breakdown.difficulty_level,
        "Generated task breakdown",
    );
    Ok(breakdown)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
