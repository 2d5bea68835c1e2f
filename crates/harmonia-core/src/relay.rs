//! Relay from free user text to a reply.
//!
//! [`Relay::complete`] returns a typed result; [`Relay::reply`] is the
//! boundary that turns every failure into a fixed fallback text, so no
//! error ever reaches the sender.

use crate::config::CoreSettings;
use crate::llm::{CompletionProvider, LlmError, OpenAiProvider};
use crate::persona::{NO_AI_FALLBACK_TEXT, TECHNICAL_PAUSE_TEXT};
use crate::types::OutgoingReply;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Forwards user text to the completion API.
///
/// Immutable after construction and shared across handlers behind an `Arc`.
pub struct Relay {
    provider: Option<Arc<dyn CompletionProvider>>,
    system_prompt: String,
    model: String,
    max_tokens: u32,
}

impl Relay {
    /// Create a relay from settings.
    ///
    /// Without an API key the relay stays in fallback-only mode and never
    /// touches the network.
    #[must_use]
    pub fn new(settings: &CoreSettings) -> Self {
        let provider = match settings.api_key() {
            Some(key) => Some(Arc::new(OpenAiProvider::new(
                key.to_string(),
                settings.openai_api_base.clone(),
            )) as Arc<dyn CompletionProvider>),
            None => {
                warn!("OPENAI_API_KEY is not set, replies will use the no-AI fallback");
                None
            }
        };
        Self::with_provider(provider, settings)
    }

    /// Create a relay around an explicit provider (or none).
    #[must_use]
    pub fn with_provider(
        provider: Option<Arc<dyn CompletionProvider>>,
        settings: &CoreSettings,
    ) -> Self {
        Self {
            provider,
            system_prompt: settings.system_prompt().to_string(),
            model: settings.chat_model.clone(),
            max_tokens: settings.chat_max_tokens,
        }
    }

    /// Returns true if a completion provider is configured
    #[must_use]
    pub fn is_ai_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Issue one completion request for `text`.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingConfig` when no provider is configured, or
    /// any error reported by the provider.
    pub async fn complete(&self, text: &str) -> Result<String, LlmError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| LlmError::MissingConfig("OPENAI_API_KEY".to_string()))?;

        let content = provider
            .chat_completion(&self.system_prompt, text, &self.model, self.max_tokens)
            .await?;
        Ok(content.trim().to_string())
    }

    /// Produce the reply for `text`, masking every failure.
    pub async fn reply(&self, text: &str) -> OutgoingReply {
        match self.complete(text).await {
            Ok(content) => OutgoingReply::new(content),
            Err(LlmError::MissingConfig(_)) => {
                debug!("Relay has no provider, sending no-AI fallback");
                OutgoingReply::from(NO_AI_FALLBACK_TEXT)
            }
            Err(e) => {
                error!("OpenAI error: {e}");
                OutgoingReply::from(TECHNICAL_PAUSE_TEXT)
            }
        }
    }
}
