use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::utils::error::AppError;
use crate::utils::response::success;

pub mod sheet;
pub mod submit;
pub mod webhook;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "intake-server",
    };

    success(payload, "Health check successful").into_response()
}

/// Answers bare `OPTIONS` requests. Real CORS preflights are handled by the
/// CORS layer before they reach the router.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> Response {
    AppError::MethodNotAllowed.into_response()
}
