//! Shared fixtures for the HTTP integration tests.
//!
//! The app is wired against the in-memory store and an HS256 validator so the
//! tests need no database or identity provider.
#![allow(dead_code)]

use actix_web::web;
use blog_service::db::InMemoryStore;
use blog_service::handlers;
use blog_service::middleware::{Claims, JwtValidator};
use blog_service::services::{CommentService, PostService};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::sync::Arc;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const BOUNDARY: &str = "----blogservicetestboundary";

/// Route table plus services backed by `store`
pub fn configure(store: Arc<InMemoryStore>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(PostService::new(
            store.clone(),
            store.clone(),
            store.clone(),
        )))
        .app_data(web::Data::new(CommentService::new(
            store.clone(),
            store.clone(),
            store,
        )))
        .app_data(web::Data::new(JwtValidator::hs256(JWT_SECRET, "token")));

        handlers::configure_routes(cfg);
    }
}

pub fn token_for(user_id: Uuid) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + Duration::hours(1)).timestamp(),
        iat: Some(now.timestamp()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to sign test token")
}

pub fn bearer(user_id: Uuid) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token_for(user_id)))
}

/// Multipart body with text fields only
pub fn multipart_body(fields: &[(&str, &str)]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

/// Multipart body with a single file field
pub fn multipart_file(
    name: &str,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
) -> (String, Vec<u8>) {
    let mut body = format!(
        "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
        BOUNDARY, name, filename, content_type
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}
