use super::UserDirectory;
use crate::error::Result;
use crate::models::AuthorSummary;
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// Reads author display fields from the `users` table owned by the identity system
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_authors(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, AuthorSummary>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let authors = sqlx::query_as::<_, AuthorSummary>(
            r#"
            SELECT id, first_name, last_name, photo_url
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(authors.into_iter().map(|a| (a.id, a)).collect())
    }
}
