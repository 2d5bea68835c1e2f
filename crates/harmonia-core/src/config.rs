//! Configuration and settings management
//!
//! Loads settings from config files and environment variables and defines
//! the completion defaults.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Default chat model for completion requests
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
/// Default cap on completion output tokens
pub const DEFAULT_CHAT_MAX_TOKENS: u32 = 500;

/// Build the layered configuration shared by every settings struct.
///
/// Sources, lowest priority first: `config/default`, `config/{RUN_MODE}`,
/// `config/local`, `APP__`-prefixed environment, plain environment.
///
/// # Errors
///
/// Returns a `ConfigError` if a present config file cannot be parsed.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Local overrides, not checked into git
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        // UPPER_SNAKE_CASE env vars map onto snake_case keys; empty vars count as unset
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

/// Completion settings loaded from the environment
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoreSettings {
    /// OpenAI API key; the relay runs in fallback-only mode without it
    pub openai_api_key: Option<String>,
    /// Custom OpenAI-compatible API base URL
    pub openai_api_base: Option<String>,
    /// Model identifier sent with every request
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Cap on completion output tokens
    #[serde(default = "default_chat_max_tokens")]
    pub chat_max_tokens: u32,
    /// Override for the persona system prompt
    pub system_prompt: Option<String>,
}

fn default_chat_model() -> String {
    DEFAULT_CHAT_MODEL.to_string()
}

const fn default_chat_max_tokens() -> u32 {
    DEFAULT_CHAT_MAX_TOKENS
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_api_base: None,
            chat_model: default_chat_model(),
            chat_max_tokens: default_chat_max_tokens(),
            system_prompt: None,
        }
    }
}

impl CoreSettings {
    /// Create new settings by loading from environment and files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(build_config()?)
    }

    /// Deserialize settings from an already built configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a value has the wrong type.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.try_deserialize()
    }

    /// Returns the API key if one is configured and non-blank
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Returns the configured system prompt or the persona default
    #[must_use]
    pub fn system_prompt(&self) -> &str {
        self.system_prompt
            .as_deref()
            .filter(|prompt| !prompt.trim().is_empty())
            .unwrap_or(crate::persona::SYSTEM_PROMPT)
    }
}
