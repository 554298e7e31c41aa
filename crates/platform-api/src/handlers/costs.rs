// ============================================================================
// Platform API - Cost Handlers
// File: crates/platform-api/src/handlers/costs.rs
// ============================================================================

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use chrono::{Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use platform_core::domain::{CostRequest, PlatformCostOverview, TenantCostSummary};
use platform_shared::constants::{DATE_FORMAT, DEFAULT_GRANULARITY, DEFAULT_GROUP_BY};

use crate::error::ApiError;
use crate::handlers::tenant_id;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Query string; missing fields fall back to last month, daily, by service.
#[derive(Debug, Default, Deserialize)]
pub struct CostParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub granularity: Option<String>,
    pub group_by: Option<String>,
}

impl CostParams {
    pub fn into_request(self, today: NaiveDate) -> CostRequest {
        let month_ago = today.checked_sub_months(Months::new(1)).unwrap_or(today);
        CostRequest {
            start_date: self
                .start_date
                .unwrap_or_else(|| month_ago.format(DATE_FORMAT).to_string()),
            end_date: self
                .end_date
                .unwrap_or_else(|| today.format(DATE_FORMAT).to_string()),
            granularity: self
                .granularity
                .unwrap_or_else(|| DEFAULT_GRANULARITY.to_string()),
            group_by: self.group_by.unwrap_or_else(|| DEFAULT_GROUP_BY.to_string()),
        }
    }
}

fn cost_request(query: Result<Query<CostParams>, QueryRejection>) -> Result<CostRequest, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(params.into_request(Utc::now().date_naive()))
}

#[derive(Debug, Serialize)]
pub struct TenantCostsResponse {
    pub tenant_id: Uuid,
    pub costs: TenantCostSummary,
    pub period: String,
}

/// Tenant costs handler - GET /api/v1/tenants/{id}/costs
pub async fn get_tenant_costs(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<CostParams>, QueryRejection>,
) -> Result<Json<ApiResponse<TenantCostsResponse>>, ApiError> {
    let id = tenant_id(path)?;
    let request = cost_request(query)?;
    let costs = state.costs.get_tenant_costs(id, &request).await?;

    Ok(Json(ApiResponse::success(TenantCostsResponse {
        tenant_id: id,
        period: costs.period.clone(),
        costs,
    })))
}

/// Overview handler - GET /api/v1/costs/overview
pub async fn get_cost_overview(
    State(state): State<AppState>,
    query: Result<Query<CostParams>, QueryRejection>,
) -> Result<Json<ApiResponse<PlatformCostOverview>>, ApiError> {
    let request = cost_request(query)?;
    let overview = state.costs.get_platform_cost_overview(&request).await?;
    Ok(Json(ApiResponse::success(overview)))
}
