/// OpenAPI documentation for the Blog Service
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers::comments::{
    CommentDeletedResponse, CommentLikeResponse, CommentListResponse, CommentResponse,
    CreateCommentRequest, EditCommentRequest,
};
use crate::handlers::posts::{
    BlogListResponse, BlogResponse, BlogViewResponse, CreateBlogRequest, LikeSummaryResponse,
    MessageResponse,
};
use crate::models::{
    AuthorSummary, Comment, CommentThread, CommentView, LikeSummary, Post, PostView,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Blog Service API",
        version = "1.0.0",
        description = "Blog post lifecycle and comment threads. Authors create, edit, publish and delete posts; any signed-in user can like posts and comment with one level of replies.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Development server"),
    ),
    tags(
        (name = "health", description = "Service health checks"),
        (name = "blogs", description = "Blog creation, updates, publishing, likes and deletion"),
        (name = "comments", description = "Comment threads on blog posts"),
    ),
    components(schemas(
        Post,
        Comment,
        AuthorSummary,
        CommentView,
        CommentThread,
        PostView,
        LikeSummary,
        CreateBlogRequest,
        CreateCommentRequest,
        EditCommentRequest,
        BlogResponse,
        BlogViewResponse,
        BlogListResponse,
        LikeSummaryResponse,
        MessageResponse,
        CommentResponse,
        CommentLikeResponse,
        CommentListResponse,
        CommentDeletedResponse,
    )),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT as a Bearer header or the `token` cookie"))
                        .build(),
                ),
            )
        }
    }
}

impl ApiDoc {
    pub fn openapi_json_path() -> &'static str {
        "/api/v1/openapi.json"
    }
}
