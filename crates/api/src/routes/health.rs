//! Health check endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health, liveness only; does not touch the stores.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
