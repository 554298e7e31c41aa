// ============================================================================
// Platform Infrastructure - AWS Cost Explorer Billing
// File: crates/platform-infrastructure/src/billing/cost_explorer.rs
// ============================================================================

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_costexplorer::error::DisplayErrorContext;
use aws_sdk_costexplorer::operation::get_cost_and_usage::GetCostAndUsageOutput;
use aws_sdk_costexplorer::types::{
    DateInterval, Expression, Granularity as CeGranularity, GroupDefinition,
    GroupDefinitionType, TagValues,
};
use aws_sdk_costexplorer::Client;
use tracing::{debug, error, info};

use platform_core::clients::BillingClient;
use platform_core::domain::{BillingQuery, CostGroup, Granularity, GroupDimension};
use platform_core::error::DomainError;
use platform_shared::config::BillingSettings;
use platform_shared::constants::DATE_FORMAT;

const OPERATION: &str = "get_cost_and_usage";

pub struct CostExplorerBilling {
    client: Client,
    metric: String,
    region: String,
}

impl CostExplorerBilling {
    pub fn new(config: &SdkConfig, metric: String) -> Self {
        let region = config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_default();
        Self {
            client: Client::new(config),
            metric,
            region,
        }
    }

    /// Loads credentials from the default provider chain for the configured region.
    pub async fn from_settings(settings: &BillingSettings) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .load()
            .await;
        info!(region = %settings.region, metric = %settings.metric, "Cost Explorer client configured");
        Self::new(&config, settings.metric.clone())
    }

    fn backend_error(&self, message: impl std::fmt::Display) -> DomainError {
        error!(region = %self.region, "Cost Explorer request failed: {}", message);
        DomainError::backend(OPERATION, &self.region, message)
    }
}

#[async_trait]
impl BillingClient for CostExplorerBilling {
    async fn query_costs(&self, query: &BillingQuery) -> Result<Vec<CostGroup>, DomainError> {
        let period = DateInterval::builder()
            .start(query.window.start.format(DATE_FORMAT).to_string())
            .end(query.window.end.format(DATE_FORMAT).to_string())
            .build()
            .map_err(|e| self.backend_error(e))?;
        let filter = Expression::builder()
            .tags(
                TagValues::builder()
                    .key(&query.filter.key)
                    .set_values(Some(query.filter.values.clone()))
                    .build(),
            )
            .build();

        let mut groups = Vec::new();
        let mut next_page_token: Option<String> = None;
        loop {
            let output = self
                .client
                .get_cost_and_usage()
                .time_period(period.clone())
                .granularity(granularity(query.granularity))
                .metrics(&self.metric)
                .set_group_by(Some(group_definitions(&query.group_by)))
                .filter(filter.clone())
                .set_next_page_token(next_page_token.take())
                .send()
                .await
                .map_err(|e| self.backend_error(DisplayErrorContext(e)))?;

            groups.extend(cost_groups(&output, &self.metric));
            match output.next_page_token() {
                Some(token) if !token.is_empty() => next_page_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(groups = groups.len(), "Cost Explorer groups fetched");
        Ok(groups)
    }
}

fn granularity(granularity: Granularity) -> CeGranularity {
    match granularity {
        Granularity::Hourly => CeGranularity::Hourly,
        Granularity::Daily => CeGranularity::Daily,
        Granularity::Monthly => CeGranularity::Monthly,
    }
}

fn group_definitions(dimensions: &[GroupDimension]) -> Vec<GroupDefinition> {
    dimensions
        .iter()
        .map(|dimension| match dimension {
            GroupDimension::Tag(key) => GroupDefinition::builder()
                .r#type(GroupDefinitionType::Tag)
                .key(key)
                .build(),
            GroupDimension::Dimension(key) => GroupDefinition::builder()
                .r#type(GroupDefinitionType::Dimension)
                .key(key)
                .build(),
        })
        .collect()
}

/// Flattens every time bucket into groups; groups without the metric are dropped.
fn cost_groups(output: &GetCostAndUsageOutput, metric: &str) -> Vec<CostGroup> {
    output
        .results_by_time()
        .iter()
        .flat_map(|bucket| bucket.groups())
        .filter_map(|group| {
            let value = group.metrics()?.get(metric)?;
            Some(CostGroup {
                keys: group.keys().to_vec(),
                amount: value.amount()?.to_string(),
                unit: value.unit().map(str::to_string),
            })
        })
        .collect()
}
