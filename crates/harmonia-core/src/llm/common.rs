//! Common utilities for OpenAI-compatible providers
//!
//! Message building, error mapping and response parsing.

use super::LlmError;
use async_openai::error::OpenAIError;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionResponse,
};

/// Build the `[system, user]` message pair for a single-turn request
///
/// # Errors
///
/// Returns `LlmError::Unknown` if message building fails.
pub fn build_openai_messages(
    system_prompt: &str,
    user_message: &str,
) -> Result<Vec<ChatCompletionRequestMessage>, LlmError> {
    Ok(vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(|e| LlmError::Unknown(e.to_string()))?
            .into(),
        ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| LlmError::Unknown(e.to_string()))?
            .into(),
    ])
}

/// Extract trimmed text content from a chat completion response
///
/// # Errors
///
/// Returns `LlmError::EmptyResponse` if there is no choice or no content.
pub fn extract_openai_response(
    response: &CreateChatCompletionResponse,
) -> Result<String, LlmError> {
    response
        .choices
        .first()
        .and_then(|c| c.message.content.as_deref())
        .map(|content| content.trim().to_string())
        .ok_or(LlmError::EmptyResponse)
}

/// Map an async-openai error onto the provider-neutral error type
#[must_use]
pub fn map_openai_error(error: OpenAIError) -> LlmError {
    match error {
        OpenAIError::Reqwest(e) => LlmError::NetworkError(e.to_string()),
        OpenAIError::ApiError(e) => LlmError::ApiError(e.to_string()),
        e @ OpenAIError::JSONDeserialize(..) => LlmError::JsonError(e.to_string()),
        e => LlmError::Unknown(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_messages_orders_system_then_user() -> Result<(), LlmError> {
        let messages = build_openai_messages("sys", "hello")?;
        assert_eq!(messages.len(), 2);
        assert!(matches!(
            messages[0],
            ChatCompletionRequestMessage::System(_)
        ));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::User(_)));
        Ok(())
    }

    #[test]
    fn test_invalid_argument_maps_to_unknown() {
        let mapped = map_openai_error(OpenAIError::InvalidArgument("bad".to_string()));
        assert!(matches!(mapped, LlmError::Unknown(msg) if msg.contains("bad")));
    }
}
