use async_trait::async_trait;

use crate::core::Result;
use crate::modules::notifications::repositories::NotificationRepository;

/// Delivery channel for user notifications
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, recipient_id: &str, message: &str) -> Result<()>;
}

/// Sink that only writes the notification to the log
#[derive(Debug, Default, Clone)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn send(&self, recipient_id: &str, message: &str) -> Result<()> {
        tracing::info!(recipient_id = %recipient_id, message = %message, "Notification");
        Ok(())
    }
}

/// Sink storing notifications in MySQL for later retrieval by clients
pub struct MySqlNotificationSink {
    repository: NotificationRepository,
}

impl MySqlNotificationSink {
    pub fn new(repository: NotificationRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl NotificationSink for MySqlNotificationSink {
    async fn send(&self, recipient_id: &str, message: &str) -> Result<()> {
        let id = self.repository.insert(recipient_id, message).await?;
        tracing::debug!(notification_id = %id, recipient_id = %recipient_id, "Notification stored");
        Ok(())
    }
}
