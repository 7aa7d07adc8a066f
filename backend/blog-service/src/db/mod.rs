/// Content store access layer
///
/// This module provides:
/// - Store traits the services are written against (`PostStore`, `CommentStore`, `UserDirectory`)
/// - PostgreSQL repositories implementing them
/// - An in-memory implementation for tests and local development
/// - Connection pool creation and embedded migrations
pub mod comment_repo;
pub mod memory;
pub mod post_repo;
pub mod user_repo;

pub use comment_repo::PgCommentRepository;
pub use memory::InMemoryStore;
pub use post_repo::PgPostRepository;
pub use user_repo::PgUserDirectory;

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::models::{AuthorSummary, Comment, NewComment, NewPost, Post, PostChanges};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Which posts a listing returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Published,
    AuthoredBy(Uuid),
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            PostFilter::All => true,
            PostFilter::Published => post.is_published,
            PostFilter::AuthoredBy(author_id) => post.author_id == *author_id,
        }
    }
}

/// Persistence of posts.
///
/// Every mutation is a single atomic operation against the store; the
/// like-set methods must not be implemented as read-modify-write.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert_post(&self, new_post: NewPost) -> Result<Post>;

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>>;

    /// Posts matching `filter`, newest first
    async fn list_posts(&self, filter: PostFilter) -> Result<Vec<Post>>;

    /// Apply `changes` and bump `updated_at`. `None` if the post does not exist.
    async fn update_post(&self, post_id: Uuid, changes: PostChanges) -> Result<Option<Post>>;

    async fn toggle_published(&self, post_id: Uuid) -> Result<Option<Post>>;

    /// Insert `user_id` into the like set if absent
    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Post>>;

    /// Remove `user_id` from the like set if present
    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Post>>;

    /// Delete the post and every comment on it as one unit.
    /// Returns false if the post did not exist.
    async fn delete_post_with_comments(&self, post_id: Uuid) -> Result<bool>;
}

/// Persistence of comments and replies.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn insert_comment(&self, new_comment: NewComment) -> Result<Comment>;

    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<Comment>>;

    /// Every comment on the given posts, oldest first
    async fn list_comments_for_posts(&self, post_ids: &[Uuid]) -> Result<Vec<Comment>>;

    async fn update_comment_content(
        &self,
        comment_id: Uuid,
        content: &str,
    ) -> Result<Option<Comment>>;

    /// Delete the comment and any replies to it. Returns the number of rows removed.
    async fn delete_comment_with_replies(&self, comment_id: Uuid) -> Result<u64>;

    /// Add `user_id` to the like set if absent, remove it otherwise
    async fn toggle_comment_like(&self, comment_id: Uuid, user_id: Uuid)
        -> Result<Option<Comment>>;
}

/// Read-only lookup of author display fields
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Known users among `user_ids`; unknown ids are absent from the map
    async fn find_authors(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, AuthorSummary>>;
}

/// Create a PostgreSQL connection pool
pub async fn create_pool(config: &DatabaseConfig) -> std::result::Result<PgPool, sqlx::Error> {
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        acquire_timeout_secs = config.acquire_timeout_secs,
        "Creating database pool"
    );

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
        .connect(&config.url)
        .await
}

/// Apply the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed successfully");
    Ok(())
}
