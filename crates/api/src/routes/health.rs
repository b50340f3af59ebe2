//! Liveness check.

use axum::{Router, routing::get};
use serde::Serialize;

use crate::AppState;
use crate::response::{ApiResponse, ApiResult};

/// Payload of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Always `"healthy"` while the process serves requests.
    pub status: &'static str,
    /// Crate version of the running binary.
    pub version: &'static str,
}

/// Public routes that need no state.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health() -> ApiResult<HealthStatus> {
    Ok(ApiResponse::ok(
        "Server is healthy",
        HealthStatus {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
        },
    ))
}
