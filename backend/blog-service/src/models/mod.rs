/// Data models for blog-service
///
/// This module defines structures for:
/// - Post: Blog posts with category, thumbnail and a like set
/// - Comment: Root comments and one-level-deep replies
/// - AuthorSummary: Display fields of the user behind a post or comment
/// - Views: Read-side aggregates returned by the API
mod category;

pub use category::Category;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Blog post
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    /// Rich-text HTML body
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    #[schema(value_type = String, example = "Blogging")]
    pub category: Category,
    pub thumbnail: Option<String>,
    pub author_id: Uuid,
    pub is_published: bool,
    /// Ids of users who liked the post, each at most once
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }
}

/// Fields required to persist a new post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub category: Category,
    pub author_id: Uuid,
}

/// Field overwrites applied by a post update. `None` leaves the stored value.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub thumbnail: Option<String>,
}

/// Comment or reply on a post
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    /// `None` for a root comment, the root's id for a reply
    pub parent_comment_id: Option<Uuid>,
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_comment_id.is_some()
    }

    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub parent_comment_id: Option<Uuid>,
}

/// Public display fields of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub photo_url: Option<String>,
}

/// Comment with its author and like count attached
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: Option<AuthorSummary>,
    pub number_of_likes: usize,
}

/// Root comment with its replies, oldest reply first
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: CommentView,
    pub replies: Vec<CommentView>,
}

/// Post with author and comments attached, newest comment first
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub author: Option<AuthorSummary>,
    pub like_count: usize,
    pub comments: Vec<CommentView>,
}

/// Like totals across every post of one author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct LikeSummary {
    pub total_blogs: usize,
    pub total_likes: usize,
}
