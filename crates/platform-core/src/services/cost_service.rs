// ============================================================================
// Platform Core - Cost Aggregation Service
// File: crates/platform-core/src/services/cost_service.rs
// ============================================================================

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use platform_shared::config::BillingSettings;
use platform_shared::constants::{DEFAULT_GROUP_BY, UNKNOWN};

use crate::clients::BillingClient;
use crate::domain::{
    BillingQuery, CostBreakdown, CostQuery, CostRequest, GroupDimension, PlatformCostOverview,
    TagFilter, TenantCostSummary,
};
use crate::error::DomainError;
use crate::repositories::CatalogStore;

/// Cost-allocation tags the billing account is set up with.
#[derive(Debug, Clone)]
pub struct CostTags {
    pub tenant_tag_key: String,
    pub project_tag_key: String,
    pub project_tag_value: String,
}

impl Default for CostTags {
    fn default() -> Self {
        Self {
            tenant_tag_key: "TenantID".to_string(),
            project_tag_key: "Project".to_string(),
            project_tag_value: "devplatform".to_string(),
        }
    }
}

impl From<&BillingSettings> for CostTags {
    fn from(settings: &BillingSettings) -> Self {
        Self {
            tenant_tag_key: settings.tenant_tag_key.clone(),
            project_tag_key: settings.project_tag_key.clone(),
            project_tag_value: settings.project_tag_value.clone(),
        }
    }
}

pub struct CostService {
    billing: Arc<dyn BillingClient>,
    catalog: Arc<dyn CatalogStore>,
    tags: CostTags,
}

impl CostService {
    pub fn new(
        billing: Arc<dyn BillingClient>,
        catalog: Arc<dyn CatalogStore>,
        tags: CostTags,
    ) -> Self {
        Self { billing, catalog, tags }
    }

    /// Costs tagged with this tenant, grouped by the requested dimension.
    pub async fn get_tenant_costs(
        &self,
        tenant_id: Uuid,
        request: &CostRequest,
    ) -> Result<TenantCostSummary, DomainError> {
        let query = request.resolve()?;
        let billing_query = BillingQuery {
            window: query.window,
            granularity: query.granularity,
            group_by: vec![
                GroupDimension::Tag(self.tags.tenant_tag_key.clone()),
                GroupDimension::Dimension(query.group_by.clone()),
            ],
            filter: TagFilter {
                key: self.tags.tenant_tag_key.clone(),
                values: vec![tenant_id.to_string()],
            },
        };

        let groups = self.billing.query_costs(&billing_query).await?;
        // Key 0 is the tenant tag, key 1 the requested dimension.
        let breakdown = CostBreakdown::from_groups(&groups, 1, Some(tenant_id), &query);
        log_breakdown("tenant", &query, &breakdown);

        Ok(TenantCostSummary {
            tenant_id,
            tenant_name: self.tenant_name(&tenant_id).await,
            total_cost: breakdown.total,
            currency: breakdown.currency,
            period: query.window.period(),
            services: breakdown.services,
            last_updated: Utc::now(),
        })
    }

    /// Per-service costs for everything carrying the platform project tag.
    /// Always grouped by service; `group_by` on the request is ignored.
    pub async fn get_platform_cost_overview(
        &self,
        request: &CostRequest,
    ) -> Result<PlatformCostOverview, DomainError> {
        let query = request.resolve()?;
        let billing_query = BillingQuery {
            window: query.window,
            granularity: query.granularity,
            group_by: vec![GroupDimension::Dimension(DEFAULT_GROUP_BY.to_string())],
            filter: TagFilter {
                key: self.tags.project_tag_key.clone(),
                values: vec![self.tags.project_tag_value.clone()],
            },
        };

        let groups = self.billing.query_costs(&billing_query).await?;
        let breakdown = CostBreakdown::from_groups(&groups, 0, None, &query);
        log_breakdown("platform", &query, &breakdown);

        Ok(PlatformCostOverview {
            total_cost: breakdown.total,
            currency: breakdown.currency,
            period: query.window.period(),
            tenant_costs: Vec::new(),
            service_costs: breakdown.services,
            monthly_trend: Vec::new(),
            last_updated: Utc::now(),
        })
    }

    async fn tenant_name(&self, tenant_id: &Uuid) -> String {
        match self.catalog.find_by_id(tenant_id).await {
            Ok(Some(tenant)) => tenant.name,
            Ok(None) => UNKNOWN.to_string(),
            Err(e) => {
                warn!(tenant_id = %tenant_id, "Tenant name lookup failed: {}", e);
                UNKNOWN.to_string()
            }
        }
    }
}

fn log_breakdown(scope: &str, query: &CostQuery, breakdown: &CostBreakdown) {
    info!(
        scope,
        period = %query.window.period(),
        granularity = %query.granularity,
        groups = breakdown.services.len(),
        skipped = breakdown.skipped,
        total = %breakdown.total,
        "Cost query aggregated"
    );
}
