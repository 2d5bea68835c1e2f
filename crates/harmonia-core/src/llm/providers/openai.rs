use crate::llm::common::{build_openai_messages, extract_openai_response, map_openai_error};
use crate::llm::{CompletionProvider, LlmError};
use async_openai::{config::OpenAIConfig, types::chat::CreateChatCompletionRequestArgs, Client};
use async_trait::async_trait;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::time::Duration;
use tracing::instrument;

/// Completion provider backed by the OpenAI chat completions API
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
}

impl OpenAiProvider {
    /// Create a new provider instance, optionally against a custom API base
    #[must_use]
    pub fn new(api_key: String, api_base: Option<String>) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = api_base.filter(|b| !b.trim().is_empty()) {
            config = config.with_api_base(base);
        }
        Self {
            client: Client::with_config(config).with_backoff(single_attempt()),
        }
    }
}

/// Backoff policy that gives up after the first attempt.
///
/// The client retries 5xx and 429 responses by default; every request here
/// must be sent exactly once.
fn single_attempt() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    #[instrument(skip(self, system_prompt, user_message))]
    async fn chat_completion(
        &self,
        system_prompt: &str,
        user_message: &str,
        model_id: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let messages = build_openai_messages(system_prompt, user_message)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(model_id)
            .messages(messages)
            .max_tokens(max_tokens)
            .build()
            .map_err(|e| LlmError::Unknown(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        extract_openai_response(&response)
    }
}
