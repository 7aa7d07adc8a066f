/// HTTP middleware utilities for blog-service
///
/// Provides JWT identity extraction, request metrics, and the ownership
/// checks used by the services.
pub mod jwt;
pub mod permissions;

pub use jwt::{Claims, JwtValidator};
pub use permissions::*;

use crate::error::AppError;
use crate::metrics::HTTP_REQUEST_DURATION_SECONDS;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::time::Instant;
use uuid::Uuid;

// =====================================================================
// JWT Authentication
// =====================================================================

/// Extracted user identifier stored in request extensions after auth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

/// Actix middleware that resolves the caller's identity from a Bearer token
/// or the auth cookie.
///
/// Requests without a valid token pass through anonymously; handlers that
/// need an identity take a [`UserId`] argument, which rejects with 401.
pub struct JwtAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
}

fn extract_token(req: &ServiceRequest, cookie_name: &str) -> Result<Option<String>, AppError> {
    if let Some(header) = req.headers().get("Authorization") {
        let value = header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".to_string()))?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".to_string()))?;
        return Ok(Some(token.trim().to_string()));
    }

    Ok(req
        .cookie(cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty()))
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let Some(validator) = req.app_data::<web::Data<JwtValidator>>().cloned() else {
                tracing::debug!("no JWT validator configured; request is anonymous");
                return service.call(req).await;
            };

            match extract_token(&req, validator.cookie_name())
                .and_then(|token| token.map(|t| validator.validate(&t)).transpose())
            {
                Ok(Some(user_id)) => {
                    req.extensions_mut().insert(UserId(user_id));
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(error = %e, path = %req.path(), "ignoring invalid credentials");
                }
            }

            service.call(req).await
        })
    }
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<UserId>()
                .copied()
                .ok_or_else(|| {
                    AppError::Unauthorized("Authentication required".to_string()).into()
                }),
        )
    }
}

// =====================================================================
// Metrics middleware
// =====================================================================

/// Records request latency by method, matched route and status.
pub struct MetricsMiddleware;

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MetricsMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct MetricsMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let start = Instant::now();

        Box::pin(async move {
            let res = service.call(req).await;
            let elapsed = start.elapsed();

            let (route, status) = match &res {
                Ok(response) => (
                    response
                        .request()
                        .match_pattern()
                        .unwrap_or_else(|| "unmatched".to_string()),
                    response.status().as_u16().to_string(),
                ),
                Err(err) => (
                    "unmatched".to_string(),
                    err.as_response_error().status_code().as_u16().to_string(),
                ),
            };

            HTTP_REQUEST_DURATION_SECONDS
                .with_label_values(&[method.as_str(), route.as_str(), status.as_str()])
                .observe(elapsed.as_secs_f64());

            tracing::debug!(
                %method,
                %path,
                %status,
                elapsed_ms = elapsed.as_millis() as u64,
                "request completed"
            );
            res
        })
    }
}
