use crate::bot::handlers::{self, is_command_text, Command};
use crate::config::BotSettings;
use crate::health::serve_liveness;
use crate::supervisor::{spawn_supervised, DEFAULT_RESTART_DELAY};
use anyhow::{anyhow, Context, Result};
use harmonia_core::relay::Relay;
use std::sync::Arc;
use std::time::Duration;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::Me;
use teloxide::update_listeners;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Run the Telegram transport runtime.
///
/// Starts Telegram long polling and the liveness server as two supervised
/// tasks under one cancellation token. Returns after Ctrl-C, or once either
/// task stops on its own.
///
/// # Errors
///
/// Returns an error if the liveness address is invalid or a supervised task
/// panicked.
pub async fn run_bot(settings: Arc<BotSettings>) -> Result<()> {
    let liveness_addr = settings.telegram.liveness_addr()?;

    let relay = Arc::new(Relay::new(settings.core.as_ref()));
    info!(
        "Relay initialized (AI {}).",
        if relay.is_ai_enabled() { "enabled" } else { "disabled" }
    );

    let bot = Bot::new(settings.telegram.telegram_token.clone());
    let cancel = CancellationToken::new();

    let mut polling = spawn_supervised(
        "telegram-polling",
        cancel.clone(),
        DEFAULT_RESTART_DELAY,
        move |token| run_polling(bot.clone(), relay.clone(), token),
    );
    let mut liveness = spawn_supervised(
        "liveness-http",
        cancel.clone(),
        DEFAULT_RESTART_DELAY,
        move |token| serve_liveness(liveness_addr, token),
    );

    info!("Bot is running...");

    let (polling_done, liveness_done, first_exit) = tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                error!("Failed to listen for Ctrl-C: {e}");
            }
            info!("Shutdown requested.");
            (false, false, Ok(()))
        }
        res = &mut polling => (true, false, log_task_exit("telegram-polling", res)),
        res = &mut liveness => (false, true, log_task_exit("liveness-http", res)),
    };

    cancel.cancel();
    let mut outcome = first_exit;
    if !polling_done {
        outcome = outcome.and(log_task_exit("telegram-polling", polling.await));
    }
    if !liveness_done {
        outcome = outcome.and(log_task_exit("liveness-http", liveness.await));
    }

    info!("Bot stopped.");
    outcome
}

fn log_task_exit(name: &str, res: Result<(), JoinError>) -> Result<()> {
    match res {
        Ok(()) => {
            info!("Task '{name}' exited.");
            Ok(())
        }
        Err(e) => {
            error!("Task '{name}' panicked: {e}");
            Err(anyhow!("task '{name}' panicked: {e}"))
        }
    }
}

async fn run_polling(bot: Bot, relay: Arc<Relay>, cancel: CancellationToken) -> Result<()> {
    let mut dispatcher = Dispatcher::builder(bot.clone(), setup_handler())
        .dependencies(dptree::deps![relay])
        .default_handler(|upd| async move {
            debug!("Unhandled update {}", upd.id.0);
        })
        .build();

    let shutdown = dispatcher.shutdown_token();
    let forward = tokio::spawn(async move {
        cancel.cancelled().await;
        // The dispatcher refuses shutdown until it has started polling.
        loop {
            match shutdown.shutdown() {
                Ok(done) => {
                    done.await;
                    return;
                }
                Err(_) => tokio::time::sleep(Duration::from_millis(100)).await,
            }
        }
    });

    info!("Telegram bot starting (polling)");
    let listener = update_listeners::polling_default(bot).await;
    let result = dispatcher
        .try_dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;
    forward.abort();

    result.context("Telegram polling could not start")
}

/// Build the update tree: recognised commands first, then non-command text.
///
/// Commands are matched without regard to case. Unknown `/commands` and
/// non-text messages fall through unhandled.
#[must_use]
pub fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .branch(
            dptree::filter_map(|msg: Message, me: Me| {
                let bot_name = me.username.as_deref().unwrap_or_default();
                msg.text().and_then(|text| Command::from_text(text, bot_name))
            })
            .endpoint(handle_command),
        )
        .branch(
            dptree::filter(|msg: Message| msg.text().is_some_and(|t| !is_command_text(t)))
                .endpoint(handle_chat),
        )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::command(bot, msg, cmd).await {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_chat(
    bot: Bot,
    msg: Message,
    relay: Arc<Relay>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = Box::pin(handlers::chat(bot, msg, relay)).await {
        error!("Text handler error: {}", e);
    }
    respond(())
}
