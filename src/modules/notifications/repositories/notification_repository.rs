use chrono::Utc;
use sqlx::MySqlPool;
use uuid::Uuid;

use crate::core::Result;

/// Persists user notifications to the notifications table
pub struct NotificationRepository {
    pool: MySqlPool,
}

impl NotificationRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, recipient_id: &str, message: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO notifications (id, recipient_id, message, is_read, created_at)
            VALUES (?, ?, ?, FALSE, ?)
            "#,
        )
        .bind(&id)
        .bind(recipient_id)
        .bind(message)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }
}
