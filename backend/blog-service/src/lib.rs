/// Blog Service Library
///
/// Post lifecycle and comment threads for the blogging platform.
///
/// # Modules
///
/// - `handlers`: Blog and comment HTTP request handlers
/// - `models`: Posts, comments, categories and read-side views
/// - `services`: Business logic layer
/// - `db`: Store traits, PostgreSQL repositories and the in-memory store
/// - `media`: Thumbnail storage
/// - `middleware`: HTTP middleware for authentication and request metrics
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Observability and metrics collection
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod media;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
