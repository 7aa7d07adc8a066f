use super::{PostFilter, PostStore};
use crate::error::Result;
use crate::models::{NewPost, Post, PostChanges};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL-backed post repository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostRepository {
    async fn insert_post(&self, new_post: NewPost) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, category, author_id, is_published, likes)
            VALUES ($1, $2, $3, TRUE, '{}')
            RETURNING id, title, subtitle, description, category, thumbnail, author_id,
                      is_published, likes, created_at, updated_at
            "#,
        )
        .bind(&new_post.title)
        .bind(new_post.category.as_str())
        .bind(new_post.author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, subtitle, description, category, thumbnail, author_id,
                   is_published, likes, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn list_posts(&self, filter: PostFilter) -> Result<Vec<Post>> {
        let posts = match filter {
            PostFilter::All => {
                sqlx::query_as::<_, Post>(
                    r#"
                    SELECT id, title, subtitle, description, category, thumbnail, author_id,
                           is_published, likes, created_at, updated_at
                    FROM posts
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
            PostFilter::Published => {
                sqlx::query_as::<_, Post>(
                    r#"
                    SELECT id, title, subtitle, description, category, thumbnail, author_id,
                           is_published, likes, created_at, updated_at
                    FROM posts
                    WHERE is_published = TRUE
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
            PostFilter::AuthoredBy(author_id) => {
                sqlx::query_as::<_, Post>(
                    r#"
                    SELECT id, title, subtitle, description, category, thumbnail, author_id,
                           is_published, likes, created_at, updated_at
                    FROM posts
                    WHERE author_id = $1
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .bind(author_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(posts)
    }

    async fn update_post(&self, post_id: Uuid, changes: PostChanges) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                subtitle = COALESCE($3, subtitle),
                description = COALESCE($4, description),
                category = COALESCE($5, category),
                thumbnail = COALESCE($6, thumbnail),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, subtitle, description, category, thumbnail, author_id,
                      is_published, likes, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(changes.title)
        .bind(changes.subtitle)
        .bind(changes.description)
        .bind(changes.category.as_ref().map(|c| c.as_str().to_string()))
        .bind(changes.thumbnail)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn toggle_published(&self, post_id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET is_published = NOT is_published, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, subtitle, description, category, thumbnail, author_id,
                      is_published, likes, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Post>> {
        // Single-row UPDATE: the row lock serialises concurrent likes on one post
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET likes = CASE WHEN $2 = ANY(likes) THEN likes ELSE array_append(likes, $2) END
            WHERE id = $1
            RETURNING id, title, subtitle, description, category, thumbnail, author_id,
                      is_published, likes, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET likes = array_remove(likes, $2)
            WHERE id = $1
            RETURNING id, title, subtitle, description, category, thumbnail, author_id,
                      is_published, likes, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete_post_with_comments(&self, post_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let comments = sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::debug!(
                %post_id,
                comments_deleted = comments.rows_affected(),
                "post deleted with comments"
            );
        }

        Ok(deleted)
    }
}
