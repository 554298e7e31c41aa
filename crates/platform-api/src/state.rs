use std::sync::Arc;

use platform_core::repositories::CatalogStore;
use platform_core::services::{ClusterService, CostService, TenantService};

use crate::auth::TokenVerifier;

#[derive(Clone)]
pub struct AppState {
    pub tenants: Arc<TenantService>,
    pub costs: Arc<CostService>,
    pub clusters: Arc<ClusterService>,
    /// Used by the readiness probe.
    pub catalog: Arc<dyn CatalogStore>,
    /// `None` when authentication is disabled.
    pub verifier: Option<Arc<TokenVerifier>>,
}
