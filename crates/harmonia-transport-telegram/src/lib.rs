#![deny(missing_docs)]
//! Telegram transport adapter for the Harmonia bot.

/// Telegram-specific bot handlers.
pub mod bot;
/// Telegram transport configuration.
pub mod config;
/// Liveness HTTP endpoint.
pub mod health;
/// Telegram runtime entrypoint.
pub mod runner;
/// Restartable background tasks.
pub mod supervisor;
