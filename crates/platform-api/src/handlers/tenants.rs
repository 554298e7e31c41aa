// ============================================================================
// Platform API - Tenant Handlers
// File: crates/platform-api/src/handlers/tenants.rs
// ============================================================================

use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use platform_core::domain::{CreateTenantRequest, TenantView};

use crate::error::ApiError;
use crate::handlers::tenant_id;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TenantListResponse {
    pub tenants: Vec<TenantView>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct TenantResponse {
    pub tenant: TenantView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// List handler - GET /api/v1/tenants
pub async fn list_tenants(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TenantListResponse>>, ApiError> {
    let tenants = state.tenants.list_tenants().await?;
    Ok(Json(ApiResponse::success(TenantListResponse {
        count: tenants.len(),
        tenants,
    })))
}

/// Create handler - POST /api/v1/tenants
pub async fn create_tenant(
    State(state): State<AppState>,
    payload: Result<Json<CreateTenantRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<TenantResponse>>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let tenant = state.tenants.create_tenant(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(TenantResponse {
            tenant,
            message: Some("Tenant created successfully".to_string()),
        })),
    ))
}

/// Get handler - GET /api/v1/tenants/{id}
pub async fn get_tenant(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<TenantResponse>>, ApiError> {
    let id = tenant_id(path)?;
    let tenant = state.tenants.get_tenant(&id).await?;
    Ok(Json(ApiResponse::success(TenantResponse {
        tenant,
        message: None,
    })))
}

/// Delete handler - DELETE /api/v1/tenants/{id}
pub async fn delete_tenant(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = tenant_id(path)?;
    state.tenants.delete_tenant(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Tenant deleted successfully".to_string(),
    })))
}
