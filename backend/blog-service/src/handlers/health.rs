/// Health, readiness and liveness probes
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use std::time::Instant;

/// Backing store probed by the readiness check. `None` means the in-memory
/// store, which is always ready.
pub struct HealthState {
    pub db_pool: Option<PgPool>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Up,
    Down,
}

#[derive(Debug, Serialize)]
pub struct StoreProbe {
    pub backend: &'static str,
    pub status: ProbeStatus,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReadinessReport {
    pub ready: bool,
    pub store: StoreProbe,
    pub checked_at: String,
}

impl HealthState {
    pub fn in_memory() -> Self {
        Self { db_pool: None }
    }

    async fn probe_store(&self) -> StoreProbe {
        let start = Instant::now();
        let (backend, result) = match &self.db_pool {
            Some(pool) => (
                "postgres",
                sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
            ),
            None => ("memory", Ok(())),
        };
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => StoreProbe {
                backend,
                status: ProbeStatus::Up,
                latency_ms,
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "store probe failed");
                StoreProbe {
                    backend,
                    status: ProbeStatus::Down,
                    latency_ms,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

pub async fn health(state: web::Data<HealthState>) -> HttpResponse {
    let probe = state.probe_store().await;
    let body = serde_json::json!({
        "service": "blog-service",
        "version": env!("CARGO_PKG_VERSION"),
        "status": probe.status,
    });

    match probe.status {
        ProbeStatus::Up => HttpResponse::Ok().json(body),
        ProbeStatus::Down => HttpResponse::ServiceUnavailable().json(body),
    }
}

pub async fn readiness(state: web::Data<HealthState>) -> HttpResponse {
    let store = state.probe_store().await;
    let report = ReadinessReport {
        ready: store.status == ProbeStatus::Up,
        store,
        checked_at: Utc::now().to_rfc3339(),
    };

    if report.ready {
        HttpResponse::Ok().json(report)
    } else {
        HttpResponse::ServiceUnavailable().json(report)
    }
}

pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "alive": true }))
}

/// Mount `/api/v1/health`, `/api/v1/health/ready` and `/api/v1/health/live`.
/// Expects `web::Data<HealthState>` in app data.
pub fn configure_health(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/health")
            .route("", web::get().to(health))
            .route("/ready", web::get().to(readiness))
            .route("/live", web::get().to(liveness)),
    );
}
