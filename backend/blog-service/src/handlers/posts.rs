/// Post handlers - HTTP endpoints for blog operations
use crate::error::{AppError, Result};
use crate::media::MediaUpload;
use crate::middleware::UserId;
use crate::models::{LikeSummary, Post, PostView};
use crate::services::{PostService, PostUpdate};
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Per-field byte limit for multipart post updates
#[derive(Debug, Clone, Copy)]
pub struct UploadLimit(pub usize);

impl Default for UploadLimit {
    fn default() -> Self {
        Self(5 * 1024 * 1024)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBlogRequest {
    #[serde(default)]
    #[validate(length(max = 300))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub category: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BlogResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub blog: Post,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BlogViewResponse {
    pub success: bool,
    pub blog: PostView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BlogListResponse {
    pub success: bool,
    pub blogs: Vec<PostView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LikeSummaryResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: LikeSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

fn blog_response(message: impl Into<String>, blog: Post) -> BlogResponse {
    BlogResponse {
        success: true,
        message: Some(message.into()),
        blog,
    }
}

/// Create a new blog post
pub async fn create_blog(
    service: web::Data<PostService>,
    user_id: UserId,
    req: web::Json<CreateBlogRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let post = service.create(user_id.0, &req.title, &req.category).await?;
    Ok(HttpResponse::Created().json(blog_response("Blog Created Successfully.", post)))
}

fn text_field(name: &str, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|_| AppError::BadRequest(format!("Field '{}' is not valid UTF-8", name)))
}

/// Read the multipart update form: text fields plus an optional `file`
async fn read_update_form(mut payload: Multipart, limit: usize) -> Result<PostUpdate> {
    let mut update = PostUpdate::default();

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?;

        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field.content_type().map(|m| m.essence_str().to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::BadRequest(format!("Error reading field '{}': {}", name, e))
            })?;
            if bytes.len() + chunk.len() > limit {
                return Err(AppError::PayloadTooLarge(format!(
                    "Field '{}' exceeds the {} byte limit",
                    name, limit
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "file" | "thumbnail" => {
                if !bytes.is_empty() {
                    update.thumbnail = Some(MediaUpload {
                        filename,
                        content_type: content_type
                            .unwrap_or_else(|| "application/octet-stream".to_string()),
                        bytes,
                    });
                }
            }
            "title" => update.title = Some(text_field(&name, bytes)?),
            "subtitle" => update.subtitle = Some(text_field(&name, bytes)?),
            "description" => update.description = Some(text_field(&name, bytes)?),
            "category" => update.category = Some(text_field(&name, bytes)?),
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    Ok(update)
}

/// Update a blog post (multipart form)
pub async fn update_blog(
    req: HttpRequest,
    service: web::Data<PostService>,
    user_id: UserId,
    blog_id: web::Path<Uuid>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let limit = req
        .app_data::<web::Data<UploadLimit>>()
        .map(|l| l.0)
        .unwrap_or_else(|| UploadLimit::default().0);

    let update = read_update_form(payload, limit).await?;
    let post = service.update(*blog_id, user_id.0, update).await?;

    Ok(HttpResponse::Ok().json(blog_response("Blog updated successfully", post)))
}

/// Every post, newest first
pub async fn get_all_blogs(service: web::Data<PostService>) -> Result<HttpResponse> {
    let blogs = service.list_all().await?;
    Ok(HttpResponse::Ok().json(BlogListResponse {
        success: true,
        blogs,
    }))
}

/// Published posts, newest first
pub async fn get_published_blogs(service: web::Data<PostService>) -> Result<HttpResponse> {
    let blogs = service.list_published().await?;
    Ok(HttpResponse::Ok().json(BlogListResponse {
        success: true,
        blogs,
    }))
}

/// Posts authored by the caller
pub async fn get_own_blogs(
    service: web::Data<PostService>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let blogs = service.list_owned_by(user_id.0).await?;
    Ok(HttpResponse::Ok().json(BlogListResponse {
        success: true,
        blogs,
    }))
}

/// Post count and like total for the caller's posts
pub async fn get_my_blogs_likes(
    service: web::Data<PostService>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let summary = service.aggregate_likes(user_id.0).await?;
    Ok(HttpResponse::Ok().json(LikeSummaryResponse {
        success: true,
        summary,
    }))
}

pub async fn toggle_publish(
    service: web::Data<PostService>,
    user_id: UserId,
    blog_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = service.toggle_publish(*blog_id, user_id.0).await?;
    let message = if post.is_published {
        "Blog Published"
    } else {
        "Blog Unpublished"
    };

    Ok(HttpResponse::Ok().json(blog_response(message, post)))
}

pub async fn delete_blog(
    service: web::Data<PostService>,
    user_id: UserId,
    blog_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    service.delete(*blog_id, user_id.0).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        success: true,
        message: "Blog deleted successfully".to_string(),
    }))
}

pub async fn get_blog(
    service: web::Data<PostService>,
    blog_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let blog = service.get_by_id(*blog_id).await?;
    Ok(HttpResponse::Ok().json(BlogViewResponse {
        success: true,
        blog,
    }))
}

pub async fn like_blog(
    service: web::Data<PostService>,
    user_id: UserId,
    blog_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = service.like(*blog_id, user_id.0).await?;
    Ok(HttpResponse::Ok().json(blog_response("Blog liked", post)))
}

pub async fn dislike_blog(
    service: web::Data<PostService>,
    user_id: UserId,
    blog_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = service.dislike(*blog_id, user_id.0).await?;
    Ok(HttpResponse::Ok().json(blog_response("Blog disliked", post)))
}
