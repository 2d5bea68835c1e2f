use dotenvy::dotenv;
use harmonia_core::config::CoreSettings;
use harmonia_transport_telegram::config::{BotSettings, TelegramSettings};
use harmonia_transport_telegram::runner::run_bot;
use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Regex patterns for redacting secrets from log output
struct RedactionPatterns {
    token_url: Regex,
    token_bare: Regex,
    openai_key: Regex,
    openai_env: Regex,
}

impl RedactionPatterns {
    /// Initialize all regex patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            token_url: Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)")?,
            token_bare: Regex::new(r"\b[0-9]{8,10}:[A-Za-z0-9_-]{35}\b")?,
            openai_key: Regex::new(r"\bsk-[A-Za-z0-9_-]{16,}")?,
            openai_env: Regex::new(r"OPENAI_API_KEY=[^\s&]+")?,
        })
    }

    fn redact(&self, input: &str) -> String {
        let output = self.token_url.replace_all(input, "$1[TELEGRAM_TOKEN]");
        let output = self.token_bare.replace_all(&output, "[TELEGRAM_TOKEN]");
        let output = self.openai_env.replace_all(&output, "OPENAI_API_KEY=[MASKED]");
        self.openai_key
            .replace_all(&output, "[OPENAI_KEY]")
            .into_owned()
    }
}

/// Log sink that masks secrets before anything reaches the output.
struct MaskedSink<F> {
    open: F,
    patterns: Arc<RedactionPatterns>,
}

/// One formatted log event, held back until it is complete.
///
/// A secret split across several `write` calls is still masked, because the
/// whole event is redacted at once on flush or drop.
struct MaskedEvent<W: Write> {
    out: W,
    pending: Vec<u8>,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> MaskedEvent<W> {
    fn emit(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let masked = self.patterns.redact(&String::from_utf8_lossy(&self.pending));
        self.pending.clear();
        self.out.write_all(masked.as_bytes())?;
        self.out.flush()
    }
}

impl<W: Write> Write for MaskedEvent<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit()
    }
}

impl<W: Write> Drop for MaskedEvent<W> {
    fn drop(&mut self) {
        let _ = self.emit();
    }
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for MaskedSink<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = MaskedEvent<W>;

    fn make_writer(&'a self) -> Self::Writer {
        MaskedEvent {
            out: (self.open)(),
            pending: Vec::new(),
            patterns: Arc::clone(&self.patterns),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // Patterns must exist before the first log line
    let patterns = Arc::new(RedactionPatterns::new().map_err(|e| {
        eprintln!("Failed to compile regex patterns: {e}");
        e
    })?);

    init_logging(patterns);

    info!("Starting Harmonia TG Bot...");

    let settings = init_settings();

    run_bot(settings).await?;

    Ok(())
}

fn init_logging(patterns: Arc<RedactionPatterns>) {
    let sink = MaskedSink {
        open: io::stderr,
        patterns,
    };

    let debug_mode = std::env::var("DEBUG_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    let filter = if debug_mode {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "harmonia_core=info,harmonia_transport_telegram=info,harmonia_telegram_bot=info,hyper=warn,reqwest=warn,async_openai=warn",
            )
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(sink))
        .init();
}

fn init_settings() -> Arc<BotSettings> {
    let core_settings = match CoreSettings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load completion configuration: {}", e);
            std::process::exit(1);
        }
    };
    let telegram_settings = match TelegramSettings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!("TELEGRAM_TOKEN is not set or configuration is invalid: {}", e);
            std::process::exit(1);
        }
    };

    info!("Configuration loaded successfully.");
    Arc::new(BotSettings::new(core_settings, telegram_settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_telegram_token_in_url() -> Result<(), regex::Error> {
        let patterns = RedactionPatterns::new()?;
        let line = "error sending request for url (https://api.telegram.org/bot123456789:AAH-abcdefghijklmnopqrstuvwxyz0123456/getUpdates)";
        let redacted = patterns.redact(line);
        assert!(redacted.contains("https://api.telegram.org/bot[TELEGRAM_TOKEN]/getUpdates"));
        assert!(!redacted.contains("AAH-abc"));
        Ok(())
    }

    #[test]
    fn test_redacts_openai_key() -> Result<(), regex::Error> {
        let patterns = RedactionPatterns::new()?;
        let redacted = patterns.redact("Incorrect API key provided: sk-proj-abcdefghijklmnop1234");
        assert_eq!(redacted, "Incorrect API key provided: [OPENAI_KEY]");

        let redacted = patterns.redact("OPENAI_API_KEY=secret123 loaded");
        assert_eq!(redacted, "OPENAI_API_KEY=[MASKED] loaded");
        Ok(())
    }

    #[test]
    fn test_secret_split_across_writes_is_masked() -> Result<(), Box<dyn std::error::Error>> {
        let patterns = Arc::new(RedactionPatterns::new()?);
        let mut out = Vec::new();
        {
            let mut event = MaskedEvent {
                out: &mut out,
                pending: Vec::new(),
                patterns,
            };
            assert_eq!(event.write(b"key sk-abcdefgh")?, 15);
            event.write_all(b"ijklmnopqrstuvwxyz\n")?;
        }
        assert_eq!(String::from_utf8(out)?, "key [OPENAI_KEY]\n");
        Ok(())
    }

    #[test]
    fn test_sink_writes_nothing_for_empty_event() -> Result<(), regex::Error> {
        let patterns = Arc::new(RedactionPatterns::new()?);
        let mut out = Vec::new();
        drop(MaskedEvent {
            out: &mut out,
            pending: Vec::new(),
            patterns,
        });
        assert!(out.is_empty());
        Ok(())
    }

    #[test]
    fn test_plain_text_is_untouched() -> Result<(), regex::Error> {
        let patterns = RedactionPatterns::new()?;
        let line = "User 42 sent a text message (5 chars).";
        assert_eq!(patterns.redact(line), line);
        Ok(())
    }
}
