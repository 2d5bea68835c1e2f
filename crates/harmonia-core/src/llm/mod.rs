//! Completion API client
//!
//! A single provider trait in front of the OpenAI chat completion API, so the
//! relay can be exercised without network access.

mod common;
/// Implementations of specific completion providers
pub mod providers;

use thiserror::Error;

pub use providers::OpenAiProvider;

/// Errors that can occur during completion requests
#[derive(Debug, Error)]
pub enum LlmError {
    /// Error returned by the provider's API
    #[error("API error: {0}")]
    ApiError(String),
    /// Error during network communication
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Error during JSON serialization or deserialization
    #[error("JSON error: {0}")]
    JsonError(String),
    /// Missing provider configuration or API key
    #[error("Missing client/API key: {0}")]
    MissingConfig(String),
    /// The API answered without any completion text
    #[error("Empty response")]
    EmptyResponse,
    /// Any other unexpected error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Interface for completion providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a single chat completion for one user message
    async fn chat_completion(
        &self,
        system_prompt: &str,
        user_message: &str,
        model_id: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError>;
}
