//! HTTP route definitions

use crate::{handlers, middleware, AppState};
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        // Service endpoints
        .route("/health", get(handlers::health_check).head(handlers::health_check))
        // Storage endpoints
        .route("/upload", post(handlers::upload_file))
        .route("/link", post(handlers::temporary_link))
        // Apply middleware
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit(state.config.max_upload_size)));

    let router = if state.config.cors_enabled {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
    } else {
        router
    };

    router.with_state(state)
}

fn body_limit(max_upload_size: u64) -> usize {
    usize::try_from(max_upload_size).unwrap_or(usize::MAX)
}
