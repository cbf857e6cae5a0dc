use std::sync::Arc;

use super::notification_sink::NotificationSink;
use crate::modules::notifications::models::LedgerEvent;

/// Fans committed ledger events out to the notification sink
///
/// Delivery happens on detached tasks after the unit of work has committed.
/// A failed delivery is logged and never affects the ledger outcome.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sink: Option<Arc<dyn NotificationSink>>,
}

impl NotificationDispatcher {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn dispatch(&self, events: Vec<LedgerEvent>) {
        let Some(sink) = &self.sink else {
            return;
        };

        for event in events {
            let sink = Arc::clone(sink);
            tokio::spawn(async move {
                let recipient = event.recipient_id().to_string();
                if let Err(e) = sink.send(&recipient, &event.message()).await {
                    tracing::warn!(
                        recipient_id = %recipient,
                        error = %e,
                        "Failed to deliver notification"
                    );
                }
            });
        }
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
