//! Billing query client trait (port)

use async_trait::async_trait;

use crate::domain::{BillingQuery, CostGroup};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BillingClient: Send + Sync {
    async fn query_costs(&self, query: &BillingQuery) -> Result<Vec<CostGroup>, DomainError>;
}
