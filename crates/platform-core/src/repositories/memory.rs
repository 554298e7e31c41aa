//! In-process catalog with the same uniqueness rules as the SQL schema.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{LifecycleStep, Tenant};
use crate::error::DomainError;
use crate::repositories::CatalogStore;

#[derive(Default)]
pub struct InMemoryCatalogStore {
    tenants: RwLock<Vec<Tenant>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn insert(&self, tenant: &Tenant) -> Result<(), DomainError> {
        let mut tenants = self.tenants.write().await;
        if tenants.iter().any(|t| t.id == tenant.id) {
            return Err(DomainError::Conflict(format!("tenant id {} already exists", tenant.id)));
        }
        if tenants.iter().any(|t| t.name == tenant.name) {
            return Err(DomainError::Conflict(format!(
                "tenant name '{}' already exists",
                tenant.name
            )));
        }
        if tenants.iter().any(|t| t.namespace == tenant.namespace) {
            return Err(DomainError::Conflict(format!(
                "tenant namespace '{}' already exists",
                tenant.namespace
            )));
        }
        tenants.push(tenant.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Tenant>, DomainError> {
        let tenants = self.tenants.read().await;
        Ok(tenants.iter().find(|t| &t.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Tenant>, DomainError> {
        let tenants = self.tenants.read().await;
        // Later inserts win ties on identical timestamps.
        let mut listed: Vec<Tenant> = tenants.iter().rev().cloned().collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn update_status(&self, id: &Uuid, step: LifecycleStep) -> Result<(), DomainError> {
        let mut tenants = self.tenants.write().await;
        let tenant = tenants
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| DomainError::tenant_not_found(id))?;
        tenant.lifecycle_step = step;
        tenant.status = step.status();
        tenant.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let mut tenants = self.tenants.write().await;
        let before = tenants.len();
        tenants.retain(|t| &t.id != id);
        if tenants.len() == before {
            return Err(DomainError::tenant_not_found(id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
