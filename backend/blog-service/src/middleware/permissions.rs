/// Authorization checks for blog-service
///
/// Ownership-based permission checks for posts and comments. Only the author
/// of a post may update, publish or delete it; only the author of a comment
/// may edit or delete it.
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Comment, Post};

/// Result type for permission checks
pub type PermissionResult = Result<(), AppError>;

/// Check if a user owns a post
pub fn check_post_ownership(user_id: Uuid, post: &Post) -> PermissionResult {
    if post.author_id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You don't have permission to modify this blog".to_string(),
        ))
    }
}

/// Check if a user owns a comment
pub fn check_comment_ownership(user_id: Uuid, comment: &Comment) -> PermissionResult {
    if comment.user_id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You don't have permission to modify this comment".to_string(),
        ))
    }
}
