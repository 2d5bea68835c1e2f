//! Telegram transport settings.

use config::ConfigError;
use harmonia_core::config::CoreSettings;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

/// Default port of the liveness HTTP server.
pub const DEFAULT_PORT: u16 = 8000;
/// Default bind host of the liveness HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Telegram transport settings loaded from environment variables.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelegramSettings {
    /// Telegram Bot API token.
    pub telegram_token: String,
    /// Liveness server port (`PORT` on most hosting platforms).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Liveness server bind host.
    #[serde(default = "default_host")]
    pub host: String,
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

/// Combined settings used by the Telegram transport layer.
#[derive(Clone)]
pub struct BotSettings {
    /// Completion settings shared with the relay.
    pub core: Arc<CoreSettings>,
    /// Telegram-specific settings.
    pub telegram: Arc<TelegramSettings>,
}

impl BotSettings {
    /// Create a new combined settings bundle.
    #[must_use]
    pub fn new(core: CoreSettings, telegram: TelegramSettings) -> Self {
        Self {
            core: Arc::new(core),
            telegram: Arc::new(telegram),
        }
    }
}

impl TelegramSettings {
    /// Create new settings by loading from environment and files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or the token is missing.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(harmonia_core::config::build_config()?)
    }

    /// Deserialize and validate settings from an already built configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `telegram_token` is missing or blank.
    pub fn from_config(config: config::Config) -> Result<Self, ConfigError> {
        let settings: Self = config.try_deserialize()?;
        if settings.telegram_token.trim().is_empty() {
            return Err(ConfigError::NotFound("telegram_token".to_string()));
        }
        Ok(settings)
    }

    /// Address the liveness server binds to.
    ///
    /// # Errors
    ///
    /// Returns an error if `host:port` is not a valid socket address.
    pub fn liveness_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Config;

    fn settings_with(overrides: &[(&str, &str)]) -> Result<TelegramSettings, ConfigError> {
        let mut builder = Config::builder();
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        TelegramSettings::from_config(builder.build()?)
    }

    #[test]
    fn test_missing_token_is_fatal() {
        assert!(settings_with(&[]).is_err());
        assert!(matches!(
            settings_with(&[("telegram_token", "  ")]),
            Err(ConfigError::NotFound(key)) if key == "telegram_token"
        ));
    }

    #[test]
    fn test_defaults_and_port_override() -> Result<(), Box<dyn std::error::Error>> {
        let settings = settings_with(&[("telegram_token", "dummy")])?;
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.liveness_addr()?.to_string(), "0.0.0.0:8000");

        let settings = settings_with(&[("telegram_token", "dummy"), ("port", "10000")])?;
        assert_eq!(settings.liveness_addr()?.port(), 10000);
        Ok(())
    }
}
