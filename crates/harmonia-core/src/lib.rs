#![deny(missing_docs)]
//! Harmonia core library.
//!
//! Transport-agnostic pieces of the bot: configuration, the completion API
//! client, the relay that turns user text into a reply, and persona texts.

/// Configuration management.
pub mod config;
/// Completion API client and provider trait.
pub mod llm;
/// Fixed persona texts.
pub mod persona;
/// Relay from user text to a reply.
pub mod relay;
/// Transport-agnostic message types.
pub mod types;

#[cfg(test)]
pub mod testing;
