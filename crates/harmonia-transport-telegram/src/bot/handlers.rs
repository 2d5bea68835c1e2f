use anyhow::Result;
use harmonia_core::persona::{EXERCISE_TEXT, WELCOME_TEXT};
use harmonia_core::relay::Relay;
use harmonia_core::types::{IncomingMessage, OutgoingReply};
use std::sync::Arc;
use teloxide::{prelude::*, types::ChatId, utils::command::BotCommands};
use tracing::info;

/// Supported commands for the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Show the welcome message
    #[command(description = "Start the bot.")]
    Start,
    /// Send the breathing exercise
    #[command(description = "Get a self-help exercise.")]
    Vprava,
}

impl Command {
    /// Parse a command from message text, ignoring the case of the command
    /// word and any arguments after it.
    ///
    /// Returns `None` for plain text, unknown commands and commands addressed
    /// to another bot.
    ///
    /// # Examples
    ///
    /// ```
    /// use harmonia_transport_telegram::bot::handlers::Command;
    ///
    /// assert_eq!(Command::from_text("/START", "harmonia_bot"), Some(Command::Start));
    /// assert_eq!(Command::from_text("/vprava now", "harmonia_bot"), Some(Command::Vprava));
    /// assert_eq!(Command::from_text("/help", "harmonia_bot"), None);
    /// ```
    #[must_use]
    pub fn from_text(text: &str, bot_name: &str) -> Option<Self> {
        if !is_command_text(text) {
            return None;
        }
        let head = text.split_whitespace().next()?;
        Self::parse(&head.to_lowercase(), bot_name).ok()
    }

    /// Fixed reply for this command
    ///
    /// # Examples
    ///
    /// ```
    /// use harmonia_transport_telegram::bot::handlers::Command;
    /// use harmonia_core::persona::WELCOME_TEXT;
    ///
    /// assert_eq!(Command::Start.reply().text, WELCOME_TEXT);
    /// ```
    #[must_use]
    pub fn reply(&self) -> OutgoingReply {
        match self {
            Self::Start => OutgoingReply::from(WELCOME_TEXT),
            Self::Vprava => OutgoingReply::from(EXERCISE_TEXT),
        }
    }
}

/// Safe extraction of user ID from a message.
/// Returns 0 if the user information is missing.
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// Returns true for text the chat handler must leave alone (`/anything`)
#[must_use]
pub fn is_command_text(text: &str) -> bool {
    text.starts_with('/')
}

/// Convert a Telegram message into a transport-agnostic incoming message.
///
/// Returns `None` for messages without text.
#[must_use]
pub fn incoming_message(msg: &Message) -> Option<IncomingMessage> {
    Some(IncomingMessage {
        sender_id: get_user_id_safe(msg),
        chat_id: msg.chat.id.0,
        text: msg.text()?.to_string(),
    })
}

async fn send_reply(bot: &Bot, chat_id: i64, reply: OutgoingReply) -> Result<()> {
    bot.send_message(ChatId(chat_id), reply.text).await?;
    Ok(())
}

/// Command handler: answers `/start` and `/vprava` with fixed text.
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn command(bot: Bot, msg: Message, cmd: Command) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    info!("User {user_id} sent command {cmd:?}.");

    send_reply(&bot, msg.chat.id.0, cmd.reply()).await
}

/// Free-text handler: relays the text and sends back exactly one reply.
///
/// # Errors
///
/// Returns an error if the reply cannot be sent. Completion failures never
/// surface here; the relay has already turned them into fallback text.
pub async fn chat(bot: Bot, msg: Message, relay: Arc<Relay>) -> Result<()> {
    let Some(incoming) = incoming_message(&msg) else {
        return Ok(());
    };
    info!(
        "User {} sent a text message ({} chars).",
        incoming.sender_id,
        incoming.text.chars().count()
    );

    let reply = relay.reply(&incoming.text).await;
    send_reply(&bot, incoming.chat_id, reply).await
}
