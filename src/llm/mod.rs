//! LLM summarization abstraction and implementations.
//!
//! The workbench hands the LLM the concatenated titles and abstracts of the
//! filtered articles plus a user-editable instruction; everything else
//! about the model is behind the [`Summarizer`] trait.

pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during summarization.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network or API communication error
    #[error("LLM request failed: {0}")]
    ApiError(String),

    /// Response shape did not match expectations
    #[error("invalid LLM response: {0}")]
    InvalidResponse(String),

    /// Configuration error (e.g., missing API key)
    #[error("LLM configuration error: {0}")]
    ConfigError(String),

    /// Other unexpected errors
    #[error("unexpected LLM error: {0}")]
    Other(String),
}

/// Result type for summarization operations.
pub type LlmResult<T> = Result<T, LlmError>;

/// System prompt fixed for every summarization request.
pub const SYSTEM_PROMPT: &str = "You summarize medical texts.";

/// Default user instruction, editable in the shell before summarizing.
pub const DEFAULT_INSTRUCTION: &str = "Summarize the key information here in bullet points. \
     Make it understandable to someone without a medical degree.";

/// Trait for LLM summarization services.
///
/// Single-turn, deterministic-temperature completion: implementations must
/// run at temperature 0 so repeated summaries of the same text agree.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Produce a summary from a system prompt and a user prompt.
    ///
    /// # Errors
    /// Returns `LlmError` if the completion fails
    async fn summarize(&self, system_prompt: &str, user_prompt: &str) -> LlmResult<String>;
}
