//! Health HTTP Routes
//!
//! Liveness endpoints that never touch the store.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

use super::response::HealthResponse;

/// Create health routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/test", get(hello_handler))
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

/// Example route
async fn hello_handler() -> impl IntoResponse {
    Json(json!({"message": "Hello World!"}))
}
