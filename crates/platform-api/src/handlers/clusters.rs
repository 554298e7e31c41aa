use axum::{
    extract::{Path, State},
    Json,
};

use platform_core::domain::{ClusterOverview, ClusterStatus, NamespaceInfo, NodeInfo};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/clusters/{name}/status
pub async fn get_cluster_status(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<ClusterStatus>>, ApiError> {
    let status = state.clusters.get_cluster_status(&name).await?;
    Ok(Json(ApiResponse::success(status)))
}

/// GET /api/v1/clusters/{name}/nodes
pub async fn get_cluster_nodes(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<Vec<NodeInfo>>>, ApiError> {
    let nodes = state.clusters.get_cluster_nodes(&name).await?;
    Ok(Json(ApiResponse::success(nodes)))
}

/// GET /api/v1/clusters/{name}/namespaces
pub async fn get_cluster_namespaces(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<Vec<NamespaceInfo>>>, ApiError> {
    let namespaces = state.clusters.get_cluster_namespaces(&name).await?;
    Ok(Json(ApiResponse::success(namespaces)))
}

/// GET /api/v1/clusters/{name}/overview
pub async fn get_cluster_overview(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<ClusterOverview>>, ApiError> {
    let overview = state.clusters.get_cluster_overview(&name).await?;
    Ok(Json(ApiResponse::success(overview)))
}
