use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use blog_service::config::StoreBackend;
use blog_service::db::{
    self, CommentStore, InMemoryStore, PgCommentRepository, PgPostRepository, PgUserDirectory,
    PostStore, UserDirectory,
};
use blog_service::handlers::{self, HealthState, UploadLimit};
use blog_service::media::{MediaStore, S3MediaStore};
use blog_service::middleware::JwtValidator;
use blog_service::openapi::ApiDoc;
use blog_service::services::{CommentService, PostService};
use sqlx::PgPool;
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

async fn openapi_json(doc: web::Data<utoipa::openapi::OpenApi>) -> actix_web::Result<HttpResponse> {
    let body = serde_json::to_string(&*doc).map_err(|e| {
        tracing::error!("OpenAPI serialization failed: {}", e);
        actix_web::error::ErrorInternalServerError("OpenAPI serialization error")
    })?;

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .body(body))
}

/// `blog-service healthcheck`: exit non-zero unless the local instance
/// answers its health probe
async fn probe_running_instance() -> io::Result<()> {
    let port = std::env::var("BLOG_SERVICE_PORT").unwrap_or_else(|_| "8000".to_string());
    let url = format!("http://127.0.0.1:{}/api/v1/health", port);

    let resp = reqwest::Client::new()
        .get(&url)
        .timeout(std::time::Duration::from_secs(3))
        .send()
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("healthcheck error: {}", e)))?;

    if resp.status().is_success() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::Other,
            format!("healthcheck returned {}", resp.status()),
        ))
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

struct Stores {
    posts: Arc<dyn PostStore>,
    comments: Arc<dyn CommentStore>,
    users: Arc<dyn UserDirectory>,
    pool: Option<PgPool>,
}

async fn build_stores(config: &blog_service::Config) -> io::Result<Stores> {
    match config.store {
        StoreBackend::Postgres => {
            let pool = db::create_pool(&config.database).await.map_err(|e| {
                io::Error::new(
                    io::ErrorKind::ConnectionRefused,
                    format!("Failed to create database pool: {}", e),
                )
            })?;
            tracing::info!("Connected to database");

            if config.database.run_migrations {
                db::run_migrations(&pool).await.map_err(|e| {
                    io::Error::new(io::ErrorKind::Other, format!("Migrations failed: {}", e))
                })?;
            }

            Ok(Stores {
                posts: Arc::new(PgPostRepository::new(pool.clone())),
                comments: Arc::new(PgCommentRepository::new(pool.clone())),
                users: Arc::new(PgUserDirectory::new(pool.clone())),
                pool: Some(pool),
            })
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            let store = Arc::new(InMemoryStore::new());
            Ok(Stores {
                posts: store.clone(),
                comments: store.clone(),
                users: store,
                pool: None,
            })
        }
    }
}

/// Blog Service
///
/// HTTP API for blog posts and their comment threads.
///
/// # Routes
///
/// - `/api/v1/blog/*` - Create, update, publish, like and delete blogs
/// - `/api/v1/comment/*` - Comment threads, edits, deletes and likes
/// - `/api/v1/health*`, `/metrics`, `/swagger-ui/` - Operations
#[actix_web::main]
async fn main() -> io::Result<()> {
    if std::env::args().nth(1).as_deref() == Some("healthcheck") {
        return probe_running_instance().await;
    }

    dotenvy::dotenv().ok();
    init_tracing();

    let config = blog_service::Config::from_env().map_err(|e| {
        tracing::error!(error = %e, "invalid configuration");
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        env = %config.app.env,
        store = ?config.store,
        "starting blog-service"
    );

    let jwt_validator = JwtValidator::from_config(&config.auth).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Failed to load JWT key: {}", e),
        )
    })?;
    if jwt_validator.is_none() {
        tracing::warn!("No JWT key configured; authenticated routes will reject every request");
    }

    let stores = build_stores(&config).await?;

    let mut post_service = PostService::new(
        stores.posts.clone(),
        stores.comments.clone(),
        stores.users.clone(),
    );
    match S3MediaStore::from_config(&config.media).await {
        Some(media) => {
            tracing::info!(bucket = ?config.media.bucket, "Thumbnail uploads enabled");
            let media: Arc<dyn MediaStore> = Arc::new(media);
            post_service = post_service.with_media(media);
        }
        None => tracing::warn!("S3_BUCKET not set; thumbnail uploads are disabled"),
    }
    let comment_service = CommentService::new(stores.posts, stores.comments, stores.users);

    let post_service = web::Data::new(post_service);
    let comment_service = web::Data::new(comment_service);
    let jwt_validator = jwt_validator.map(web::Data::new);
    let upload_limit = web::Data::new(UploadLimit(config.media.max_upload_bytes));
    let health_state = web::Data::new(HealthState {
        db_pool: stores.pool,
    });

    let http_bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", http_bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        let openapi_doc = ApiDoc::openapi();

        let mut app = App::new()
            .app_data(web::Data::new(openapi_doc.clone()))
            .app_data(post_service.clone())
            .app_data(comment_service.clone())
            .app_data(upload_limit.clone())
            .app_data(health_state.clone());
        if let Some(validator) = &jwt_validator {
            app = app.app_data(validator.clone());
        }

        app.service(
            SwaggerUi::new("/swagger-ui/{_:.*}")
                .url(ApiDoc::openapi_json_path(), openapi_doc.clone()),
        )
        .route(ApiDoc::openapi_json_path(), web::get().to(openapi_json))
        .wrap(cors)
        .wrap(Logger::default())
        .wrap(tracing_actix_web::TracingLogger::default())
        .route("/metrics", web::get().to(blog_service::metrics::serve_metrics))
        .configure(handlers::configure_health)
        .configure(handlers::configure_routes)
    })
    .bind(&http_bind_address)?
    .workers(config.app.workers)
    .run();

    let server_handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received");
        server_handle.stop(true).await;
    });

    let result = server.await;
    tracing::info!("blog-service shutting down");
    result
}
