/// HTTP handlers for blog endpoints
///
/// This module contains handlers for:
/// - Blogs: create, update, publish toggle, delete, like/dislike, listings
/// - Comments: threads, replies, edits, deletes, like toggles
/// - Health: liveness and readiness probes
///
/// [`configure_routes`] mounts the blog and comment API under `/api/v1`.
pub mod comments;
pub mod health;
pub mod posts;

// Re-export handler functions at module level
pub use comments::{
    create_comment, delete_comment, edit_comment, get_comments_of_post, like_comment,
};
pub use health::{configure_health, HealthState};
pub use posts::{
    create_blog, delete_blog, dislike_blog, get_all_blogs, get_blog, get_my_blogs_likes,
    get_own_blogs, get_published_blogs, like_blog, toggle_publish, update_blog, UploadLimit,
};

use crate::error::AppError;
use crate::middleware::{JwtAuthMiddleware, MetricsMiddleware};
use actix_web::web;

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1024 * 1024)
        .error_handler(|err, _req| {
            AppError::BadRequest(format!("Invalid JSON body: {}", err)).into()
        })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(format!("Invalid id: {}", err)).into())
}

/// Mount the blog and comment API. Services are expected in app data as
/// `web::Data<PostService>` and `web::Data<CommentService>`; a
/// `web::Data<JwtValidator>` enables authentication.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(json_config())
            .app_data(path_config())
            .wrap(JwtAuthMiddleware)
            .wrap(MetricsMiddleware)
            .service(
                web::scope("/blog")
                    .route("", web::post().to(create_blog))
                    .route("/get-all-blogs", web::get().to(get_all_blogs))
                    .route("/get-published-blogs", web::get().to(get_published_blogs))
                    .route("/get-own-blogs", web::get().to(get_own_blogs))
                    .route("/my-blogs/likes", web::get().to(get_my_blogs_likes))
                    .service(
                        web::resource("/{blog_id}")
                            .route(web::get().to(get_blog))
                            .route(web::put().to(update_blog))
                            .route(web::delete().to(delete_blog)),
                    )
                    .route("/{blog_id}/publish", web::patch().to(toggle_publish))
                    .route("/{blog_id}/like", web::get().to(like_blog))
                    .route("/{blog_id}/dislike", web::get().to(dislike_blog)),
            )
            .service(
                web::scope("/comment")
                    .route("/{blog_id}/create", web::post().to(create_comment))
                    .route("/{blog_id}/comment/all", web::get().to(get_comments_of_post))
                    .route("/{comment_id}/edit", web::put().to(edit_comment))
                    .route("/{comment_id}/delete", web::delete().to(delete_comment))
                    .route("/{comment_id}/like", web::get().to(like_comment)),
            ),
    );
}
