//! Service-level handlers

use axum::{http::StatusCode, response::IntoResponse};

/// GET|HEAD /health - Health check
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
