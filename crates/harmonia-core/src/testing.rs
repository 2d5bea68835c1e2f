//! Testing helpers and mock utilities.

use crate::llm::MockCompletionProvider;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::instrument::WithSubscriber;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Create a mock provider that answers every request with `response_text`.
#[must_use]
pub fn mock_provider_simple(response_text: &'static str) -> MockCompletionProvider {
    let mut mock = MockCompletionProvider::new();
    mock.expect_chat_completion()
        .returning(move |_, _, _, _| Ok(response_text.to_string()));
    mock
}

/// Run `fut` under a subscriber that records the message of every ERROR event.
pub async fn capture_errors<F: Future>(fut: F) -> (F::Output, Vec<String>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(ErrorCollector {
        events: events.clone(),
    });

    let output = fut.with_subscriber(subscriber).await;

    let captured = events.lock().map(|e| e.clone()).unwrap_or_default();
    (output, captured)
}

struct ErrorCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S: Subscriber> Layer<S> for ErrorCollector {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::ERROR {
            return;
        }
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        if let Ok(mut events) = self.events.lock() {
            events.push(visitor.0);
        }
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}
