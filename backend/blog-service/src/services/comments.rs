/// Comment service - handles comment threads, edits, deletes and likes
use crate::db::{CommentStore, PostStore, UserDirectory};
use crate::error::{AppError, Result};
use crate::metrics::record_comment_operation;
use crate::middleware::permissions::check_comment_ownership;
use crate::models::{Comment, CommentThread, CommentView, NewComment};
use crate::services::threads;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

fn comment_not_found() -> AppError {
    AppError::NotFound("Comment not found".to_string())
}

fn blank_content() -> AppError {
    AppError::ValidationError("Comment content is required".to_string())
}

pub struct CommentService {
    posts: Arc<dyn PostStore>,
    comments: Arc<dyn CommentStore>,
    users: Arc<dyn UserDirectory>,
}

impl CommentService {
    pub fn new(
        posts: Arc<dyn PostStore>,
        comments: Arc<dyn CommentStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            posts,
            comments,
            users,
        }
    }

    async fn ensure_post_exists(&self, post_id: Uuid) -> Result<()> {
        match self.posts.find_post(post_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("Blog not found".to_string())),
        }
    }

    async fn find_existing(&self, comment_id: Uuid) -> Result<Comment> {
        self.comments
            .find_comment(comment_id)
            .await?
            .ok_or_else(comment_not_found)
    }

    /// Create a root comment, or a reply when `parent_comment_id` is set.
    ///
    /// A reply must target a root comment on the same post.
    pub async fn create(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
        parent_comment_id: Option<Uuid>,
    ) -> Result<CommentView> {
        let result: Result<CommentView> = async {
            let content = content.trim();
            if content.is_empty() {
                return Err(blank_content());
            }

            self.ensure_post_exists(post_id).await?;

            if let Some(parent_id) = parent_comment_id {
                let parent = self
                    .comments
                    .find_comment(parent_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Parent comment not found".to_string()))?;

                if parent.post_id != post_id {
                    return Err(AppError::ValidationError(
                        "Parent comment belongs to a different blog".to_string(),
                    ));
                }
                if parent.is_reply() {
                    return Err(AppError::ValidationError(
                        "Replies cannot be nested".to_string(),
                    ));
                }
            }

            let comment = self
                .comments
                .insert_comment(NewComment {
                    post_id,
                    user_id,
                    content: content.to_string(),
                    parent_comment_id,
                })
                .await?;

            info!(
                comment_id = %comment.id,
                %post_id,
                %user_id,
                is_reply = comment.is_reply(),
                "comment created"
            );
            threads::load_comment_view(self.users.as_ref(), comment).await
        }
        .await;

        record_comment_operation("create", &result);
        result
    }

    /// Replace the content of a comment authored by `requester_id`
    pub async fn edit(
        &self,
        comment_id: Uuid,
        requester_id: Uuid,
        content: &str,
    ) -> Result<CommentView> {
        let result: Result<CommentView> = async {
            let comment = self.find_existing(comment_id).await?;

            let content = content.trim();
            if content.is_empty() {
                return Err(blank_content());
            }
            check_comment_ownership(requester_id, &comment)?;

            let comment = self
                .comments
                .update_comment_content(comment_id, content)
                .await?
                .ok_or_else(comment_not_found)?;

            info!(%comment_id, "comment edited");
            threads::load_comment_view(self.users.as_ref(), comment).await
        }
        .await;

        record_comment_operation("edit", &result);
        result
    }

    /// Delete a comment authored by `requester_id`. Deleting a root comment
    /// deletes its replies too.
    pub async fn delete(&self, comment_id: Uuid, requester_id: Uuid) -> Result<()> {
        let result: Result<()> = async {
            let comment = self.find_existing(comment_id).await?;
            check_comment_ownership(requester_id, &comment)?;

            let removed = self.comments.delete_comment_with_replies(comment_id).await?;
            if removed == 0 {
                return Err(comment_not_found());
            }

            info!(%comment_id, removed, "comment deleted");
            Ok(())
        }
        .await;

        record_comment_operation("delete", &result);
        result
    }

    /// Toggle `user_id` in the comment's like set. Returns the updated
    /// comment and whether the user now likes it.
    pub async fn like(&self, comment_id: Uuid, user_id: Uuid) -> Result<(CommentView, bool)> {
        let result: Result<(CommentView, bool)> = async {
            let comment = self
                .comments
                .toggle_comment_like(comment_id, user_id)
                .await?
                .ok_or_else(comment_not_found)?;

            let liked = comment.is_liked_by(user_id);
            let view = threads::load_comment_view(self.users.as_ref(), comment).await?;
            Ok((view, liked))
        }
        .await;

        record_comment_operation("like", &result);
        result
    }

    /// Root comments of a post newest first, each with its replies oldest first
    pub async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<CommentThread>> {
        self.ensure_post_exists(post_id).await?;
        threads::load_threads(self.comments.as_ref(), self.users.as_ref(), post_id).await
    }
}
