use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

/// Health handler - GET /api/v1/health
pub async fn health_check() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        service: "platform-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Readiness handler - GET /api/v1/health/ready
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<HealthResponse>>, ApiError> {
    state.catalog.ping().await?;
    Ok(Json(ApiResponse::success(HealthResponse {
        status: "ready".to_string(),
        service: "platform-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })))
}
