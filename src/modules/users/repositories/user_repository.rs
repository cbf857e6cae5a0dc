use sqlx::{Executor, MySql};

use crate::core::Result;

/// User directory lookups for reference validation
pub struct UserRepository;

impl UserRepository {
    pub async fn exists<'e, E>(executor: E, id: &str) -> Result<bool>
    where
        E: Executor<'e, Database = MySql>,
    {
        let found: Option<i32> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(found.is_some())
    }
}
