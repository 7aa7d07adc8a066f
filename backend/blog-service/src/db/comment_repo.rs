use super::CommentStore;
use crate::error::Result;
use crate::models::{Comment, NewComment};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL-backed comment repository
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentStore for PgCommentRepository {
    async fn insert_comment(&self, new_comment: NewComment) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, user_id, content, parent_comment_id, likes)
            VALUES ($1, $2, $3, $4, '{}')
            RETURNING id, post_id, user_id, content, parent_comment_id, likes, created_at, updated_at
            "#,
        )
        .bind(new_comment.post_id)
        .bind(new_comment.user_id)
        .bind(&new_comment.content)
        .bind(new_comment.parent_comment_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, content, parent_comment_id, likes, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn list_comments_for_posts(&self, post_ids: &[Uuid]) -> Result<Vec<Comment>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, content, parent_comment_id, likes, created_at, updated_at
            FROM comments
            WHERE post_id = ANY($1)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn update_comment_content(
        &self,
        comment_id: Uuid,
        content: &str,
    ) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, post_id, user_id, content, parent_comment_id, likes, created_at, updated_at
            "#,
        )
        .bind(comment_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn delete_comment_with_replies(&self, comment_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE id = $1 OR parent_comment_id = $1
            "#,
        )
        .bind(comment_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn toggle_comment_like(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET likes = CASE
                WHEN $2 = ANY(likes) THEN array_remove(likes, $2)
                ELSE array_append(likes, $2)
            END
            WHERE id = $1
            RETURNING id, post_id, user_id, content, parent_comment_id, likes, created_at, updated_at
            "#,
        )
        .bind(comment_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }
}
