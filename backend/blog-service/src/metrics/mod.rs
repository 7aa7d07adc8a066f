//! Prometheus metrics for blog-service.
//!
//! Exposes post and comment operation counters, HTTP latency, and the
//! handler for the `/metrics` endpoint.

use crate::error::{AppError, Result};
use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// HTTP request latency by method, matched route and status.
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "blog_http_request_duration_seconds",
        "HTTP request duration segmented by method, route and status",
        &["method", "route", "status"]
    )
    .expect("failed to register blog_http_request_duration_seconds");

    /// Post operations by outcome (success, not_found, forbidden, invalid, error).
    pub static ref POST_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_post_operations_total",
        "Post lifecycle operations segmented by operation and outcome",
        &["operation", "outcome"]
    )
    .expect("failed to register blog_post_operations_total");

    /// Comment operations by outcome.
    pub static ref COMMENT_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_comment_operations_total",
        "Comment thread operations segmented by operation and outcome",
        &["operation", "outcome"]
    )
    .expect("failed to register blog_comment_operations_total");
}

fn outcome<T>(result: &Result<T>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(AppError::NotFound(_)) => "not_found",
        Err(AppError::Forbidden(_)) => "forbidden",
        Err(AppError::ValidationError(_)) | Err(AppError::BadRequest(_)) => "invalid",
        Err(_) => "error",
    }
}

pub fn record_post_operation<T>(operation: &str, result: &Result<T>) {
    POST_OPERATIONS_TOTAL
        .with_label_values(&[operation, outcome(result)])
        .inc();
}

pub fn record_comment_operation<T>(operation: &str, result: &Result<T>) {
    COMMENT_OPERATIONS_TOTAL
        .with_label_values(&[operation, outcome(result)])
        .inc();
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
