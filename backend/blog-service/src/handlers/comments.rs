/// Comment handlers - HTTP endpoints for comment operations
use crate::error::Result;
use crate::middleware::UserId;
use crate::models::{CommentThread, CommentView};
use crate::services::CommentService;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCommentRequest {
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub content: String,
    #[serde(default, alias = "parentCommentId")]
    pub parent_comment_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EditCommentRequest {
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    pub success: bool,
    pub message: String,
    pub comment: CommentView,
}

/// Like toggle result. The comment goes out under `updatedComment`, the key
/// the web client reads.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommentLikeResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "updatedComment")]
    pub comment: CommentView,
    pub liked: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentListResponse {
    pub success: bool,
    pub comments: Vec<CommentThread>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentDeletedResponse {
    pub success: bool,
    pub message: String,
}

/// Create a comment or reply on a blog post
pub async fn create_comment(
    service: web::Data<CommentService>,
    user_id: UserId,
    blog_id: web::Path<Uuid>,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let comment = service
        .create(*blog_id, user_id.0, &req.content, req.parent_comment_id)
        .await?;

    Ok(HttpResponse::Created().json(CommentResponse {
        success: true,
        message: "Comment added".to_string(),
        comment,
    }))
}

/// Threads of a blog post
pub async fn get_comments_of_post(
    service: web::Data<CommentService>,
    blog_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let comments = service.list_by_post(*blog_id).await?;
    Ok(HttpResponse::Ok().json(CommentListResponse {
        success: true,
        comments,
    }))
}

pub async fn edit_comment(
    service: web::Data<CommentService>,
    user_id: UserId,
    comment_id: web::Path<Uuid>,
    req: web::Json<EditCommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let comment = service.edit(*comment_id, user_id.0, &req.content).await?;
    Ok(HttpResponse::Ok().json(CommentResponse {
        success: true,
        message: "Comment updated successfully".to_string(),
        comment,
    }))
}

pub async fn delete_comment(
    service: web::Data<CommentService>,
    user_id: UserId,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    service.delete(*comment_id, user_id.0).await?;
    Ok(HttpResponse::Ok().json(CommentDeletedResponse {
        success: true,
        message: "Comment deleted successfully".to_string(),
    }))
}

/// Toggle the caller's like on a comment
pub async fn like_comment(
    service: web::Data<CommentService>,
    user_id: UserId,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let (comment, liked) = service.like(*comment_id, user_id.0).await?;
    let message = if liked {
        "Comment liked"
    } else {
        "Comment unliked"
    };

    Ok(HttpResponse::Ok().json(CommentLikeResponse {
        success: true,
        message: message.to_string(),
        comment,
        liked,
    }))
}
