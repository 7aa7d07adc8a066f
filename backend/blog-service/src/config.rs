/// Configuration management for Blog Service
///
/// This module handles loading configuration from environment variables.
/// A `.env` file is honoured by the binary before `Config::from_env` runs.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Token validation settings
    pub auth: AuthConfig,
    /// Thumbnail storage
    pub media: MediaConfig,
    /// Which content store backs the services
    pub store: StoreBackend,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// HTTP worker count
    pub workers: usize,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    /// Run embedded migrations at startup
    pub run_migrations: bool,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("max_lifetime_secs", &self.max_lifetime_secs)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

/// JWT validation keys. RS256 is preferred; HS256 is accepted for
/// deployments that share a secret with the identity provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_public_key_pem: Option<String>,
    pub jwt_secret: Option<String>,
    /// Name of the cookie carrying the token when no Authorization header is sent
    pub cookie_name: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_public_key_pem", &self.jwt_public_key_pem.as_ref().map(|_| "[SET]"))
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("cookie_name", &self.cookie_name)
            .finish()
    }
}

/// S3 settings for thumbnail uploads. Uploads are disabled when no bucket is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub bucket: Option<String>,
    pub region: String,
    /// Public base URL (CDN domain) used to build object URLs
    pub base_url: Option<String>,
    /// Whether to use path-style URLs (false = virtual-hosted-style)
    pub path_style: bool,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("BLOG_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("BLOG_SERVICE_PORT", 8000)?,
                workers: parse_env_or_default("BLOG_SERVICE_WORKERS", 4)?,
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:5173".to_string(),
                };

                if production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/blog".to_string()),
                max_connections: parse_env_or_default("DB_MAX_CONNECTIONS", 20)?,
                min_connections: parse_env_or_default("DB_MIN_CONNECTIONS", 2)?,
                acquire_timeout_secs: parse_env_or_default("DB_ACQUIRE_TIMEOUT_SECS", 10)?,
                idle_timeout_secs: parse_env_or_default("DB_IDLE_TIMEOUT_SECS", 600)?,
                max_lifetime_secs: parse_env_or_default("DB_MAX_LIFETIME_SECS", 1800)?,
                run_migrations: parse_env_or_default("DB_RUN_MIGRATIONS", true)?,
            },
            auth: {
                let jwt_public_key_pem = non_empty_env("JWT_PUBLIC_KEY_PEM");
                let jwt_secret = non_empty_env("JWT_SECRET");

                if production && jwt_public_key_pem.is_none() && jwt_secret.is_none() {
                    return Err(
                        "JWT_PUBLIC_KEY_PEM or JWT_SECRET must be set in production".to_string(),
                    );
                }

                AuthConfig {
                    jwt_public_key_pem,
                    jwt_secret,
                    cookie_name: std::env::var("AUTH_COOKIE_NAME")
                        .unwrap_or_else(|_| "token".to_string()),
                }
            },
            media: MediaConfig {
                bucket: non_empty_env("S3_BUCKET"),
                region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                base_url: non_empty_env("S3_BASE_URL"),
                path_style: parse_env_or_default("S3_PATH_STYLE", false)?,
                max_upload_bytes: parse_env_or_default("MEDIA_MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            },
            store: match std::env::var("STORE_BACKEND")
                .unwrap_or_else(|_| "postgres".to_string())
                .to_lowercase()
                .as_str()
            {
                "postgres" => StoreBackend::Postgres,
                "memory" if production => {
                    return Err("STORE_BACKEND=memory is not allowed in production".to_string())
                }
                "memory" => StoreBackend::Memory,
                other => return Err(format!("Unknown STORE_BACKEND '{}'", other)),
            },
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
